use thiserror::Error;

/// Classified failure of an external inference call.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Malformed inference response: {message}")]
    MalformedResponse { message: String },

    #[error("Inference transport error: {message}")]
    Transport { message: String },

    #[error("Inference request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[derive(Error, Debug)]
pub enum LinkerError {
    #[error("Inference call failed: {0}")]
    InferenceError(#[from] InferenceError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Inference,
    Input,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LinkerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkerError::InferenceError(_) => ErrorCategory::Inference,
            LinkerError::ConfigError { .. }
            | LinkerError::MissingConfigError { .. }
            | LinkerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LinkerError::ValidationError { .. } => ErrorCategory::Input,
            LinkerError::IoError(_) | LinkerError::CsvError(_) => ErrorCategory::Output,
            LinkerError::SerializationError(_) | LinkerError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Timeouts and transport hiccups are worth a rerun of the whole link.
            LinkerError::InferenceError(InferenceError::Timeout { .. })
            | LinkerError::InferenceError(InferenceError::Transport { .. }) => {
                ErrorSeverity::Medium
            }
            LinkerError::InferenceError(InferenceError::MalformedResponse { .. })
            | LinkerError::ValidationError { .. }
            | LinkerError::ProcessingError { .. }
            | LinkerError::SerializationError(_) => ErrorSeverity::High,
            LinkerError::ConfigError { .. }
            | LinkerError::MissingConfigError { .. }
            | LinkerError::InvalidConfigValueError { .. }
            | LinkerError::IoError(_)
            | LinkerError::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LinkerError::InferenceError(InferenceError::Timeout { .. }) => {
                "Retry the run, or raise request_timeout_seconds in config.toml"
            }
            LinkerError::InferenceError(InferenceError::Transport { .. }) => {
                "Check network access, api_base and that the API key environment variable is set"
            }
            LinkerError::InferenceError(InferenceError::MalformedResponse { .. }) => {
                "Retry the run; if it keeps failing try a different model in config.toml"
            }
            LinkerError::ValidationError { .. } => {
                "Check the input files are legible receipts and statements in a supported format"
            }
            LinkerError::ConfigError { .. }
            | LinkerError::MissingConfigError { .. }
            | LinkerError::InvalidConfigValueError { .. } => {
                "Fix config.toml under $XDG_CONFIG_HOME/receipt_statement_linker"
            }
            LinkerError::IoError(_) | LinkerError::CsvError(_) => {
                "Check the input paths exist and the output location is writable"
            }
            LinkerError::SerializationError(_) | LinkerError::ProcessingError { .. } => {
                "Rerun with --verbose and inspect the log output"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Inference => format!("The inference service failed: {}", self),
            ErrorCategory::Input => format!("Input could not be used: {}", self),
            ErrorCategory::Output => format!("File access failed: {}", self),
            ErrorCategory::Processing => format!("Linking failed: {}", self),
        }
    }
}

impl From<toml::de::Error> for LinkerError {
    fn from(e: toml::de::Error) -> Self {
        LinkerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

impl From<reqwest::Error> for LinkerError {
    fn from(e: reqwest::Error) -> Self {
        LinkerError::InferenceError(InferenceError::from(e))
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            InferenceError::MalformedResponse {
                message: e.to_string(),
            }
        } else {
            InferenceError::Transport {
                message: e.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkerError>;
