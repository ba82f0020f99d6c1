use crate::domain::input::SUPPORTED_EXTENSIONS;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "receipt-statement-linker")]
#[command(about = "Parse receipt and statement images, link transactions to receipts and categorize them")]
pub struct CliConfig {
    /// Receipt images to parse
    #[arg(long, num_args = 1.., required = true)]
    pub receipt_input: Vec<String>,

    /// Statement images or PDFs to parse
    #[arg(long, num_args = 1.., required = true)]
    pub statement_input: Vec<String>,

    /// Where to write the linked pairs as JSON
    #[arg(long, default_value = "linked_transactions.json")]
    pub output: String,

    /// Also write a CSV summary to this path
    #[arg(long)]
    pub csv_output: Option<String>,

    /// Config file to use instead of the one under $XDG_CONFIG_HOME
    #[arg(long)]
    pub config: Option<String>,

    /// Skip the categorization stage
    #[arg(long)]
    pub no_categorize: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_file_extensions("receipt_input", &self.receipt_input, &SUPPORTED_EXTENSIONS)?;
        validation::validate_file_extensions(
            "statement_input",
            &self.statement_input,
            &SUPPORTED_EXTENSIONS,
        )?;
        validation::validate_path("output", &self.output)?;
        if let Some(csv_output) = &self.csv_output {
            validation::validate_path("csv_output", csv_output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_inputs() {
        let config = CliConfig::try_parse_from([
            "receipt-statement-linker",
            "--receipt-input",
            "a.jpg",
            "b.png",
            "--statement-input",
            "march.pdf",
            "--no-categorize",
        ])
        .unwrap();

        assert_eq!(config.receipt_input, vec!["a.jpg", "b.png"]);
        assert_eq!(config.statement_input, vec!["march.pdf"]);
        assert_eq!(config.output, "linked_transactions.json");
        assert!(config.no_categorize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(CliConfig::try_parse_from(["receipt-statement-linker", "--receipt-input", "a.jpg"]).is_err());
    }

    #[test]
    fn test_unsupported_input_fails_validation() {
        let config = CliConfig::try_parse_from([
            "receipt-statement-linker",
            "--receipt-input",
            "a.heic",
            "--statement-input",
            "march.pdf",
        ])
        .unwrap();

        assert!(config.validate().is_err());
    }
}
