use crate::domain::category::Category;
use crate::domain::input::FileInput;
use crate::domain::model::{Receipt, Transaction, TranscribedStatements};
use crate::utils::error::{InferenceError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Destination for run output. Inputs are read by [`FileInput`] itself.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn transcription_model(&self) -> &str;
    fn matching_model(&self) -> &str;
    fn categorization_model(&self) -> &str;
    fn categorization_notes(&self) -> Option<&str>;
    fn concurrent_requests(&self) -> usize;
}

/// Decides whether a receipt vendor and a statement line name the same
/// merchant. May be slow, may fail, and is not guaranteed to be idempotent.
#[async_trait]
pub trait VendorMatcher: Send + Sync {
    async fn matches(&self, receipt_vendor: &str, transaction_name: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub mime_type: String,
    pub base64_data: String,
}

impl Attachment {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub attachments: Vec<Attachment>,
}

impl InferenceRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// An external inference capability that answers with a JSON document.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Returns the raw JSON text produced by the model.
    async fn complete(&self, request: InferenceRequest) -> Result<String>;
}

/// Parses a model answer into `T`. Anything that does not fit the shape is a
/// malformed response.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let trimmed = strip_code_fence(raw);
    serde_json::from_str(trimmed).map_err(|e| {
        InferenceError::MalformedResponse {
            message: format!("{} (response: {})", e, truncate(raw, 200)),
        }
        .into()
    })
}

// Some models wrap JSON in ```json fences even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn truncate(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe_receipt(&self, input: &FileInput) -> Result<Receipt>;
    async fn transcribe_statement(&self, input: &FileInput) -> Result<TranscribedStatements>;
}

#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize_transaction(
        &self,
        transaction: &Transaction,
        receipt: Option<&Receipt>,
    ) -> Result<Category>;

    /// One category per line item, in item order.
    async fn categorize_items(&self, receipt: &Receipt) -> Result<Vec<Category>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LinkerError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        same_vendor: bool,
    }

    #[test]
    fn test_parse_structured_accepts_fenced_json() {
        let verdict: Verdict = parse_structured("```json\n{\"same_vendor\": true}\n```").unwrap();
        assert!(verdict.same_vendor);
    }

    #[test]
    fn test_parse_structured_rejects_wrong_shape() {
        let err = parse_structured::<Verdict>("{\"answer\": \"yes\"}").unwrap_err();
        assert!(matches!(
            err,
            LinkerError::InferenceError(InferenceError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_attachment_data_url() {
        let attachment = Attachment {
            mime_type: "image/png".to_string(),
            base64_data: "aGk=".to_string(),
        };
        assert_eq!(attachment.data_url(), "data:image/png;base64,aGk=");
    }
}
