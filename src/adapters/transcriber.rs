use crate::domain::input::FileInput;
use crate::domain::model::{Receipt, TranscribedStatements};
use crate::domain::ports::{parse_structured, InferenceClient, InferenceRequest, Transcriber};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You transcribe financial documents into JSON. Copy names and \
amounts exactly as printed. Amounts are plain numbers without currency symbols. Dates use \
ISO-8601 (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS). Answer with JSON only.";

const RECEIPT_PROMPT: &str = "Transcribe this receipt into a JSON object with the fields: \
\"vendor\" (string), \"datetime\" (string), \"items\" (array of {\"quantity\": positive integer, \
\"name\": string, \"price\": number}), \"subtotal\" (number) and \"grand_total\" (number, the \
amount actually charged including tax and tip).";

const STATEMENT_PROMPT: &str = "Transcribe this bank statement into a JSON object with a single \
field \"transcribed_statements\": an array with one entry per statement period, each having \
\"opening_balance\" (number or null), \"closing_balance\" (number or null) and \"transactions\" \
(array of {\"name\": string, \"datetime\": string, \"withdrawal_amount\": number or null, \
\"deposit_amount\": number or null}). Withdrawals and deposits are both positive numbers; \
list transactions in the order they appear.";

/// Turns receipt and statement images into records with a vision model.
pub struct LlmTranscriber {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl LlmTranscriber {
    pub fn new(client: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    async fn request(&self, prompt: &str, input: &FileInput) -> Result<String> {
        let request = InferenceRequest::new(&self.model, prompt)
            .with_system(SYSTEM_PROMPT)
            .with_attachment(input.attachment().await?);
        self.client.complete(request).await
    }
}

#[async_trait]
impl Transcriber for LlmTranscriber {
    async fn transcribe_receipt(&self, input: &FileInput) -> Result<Receipt> {
        tracing::info!("Transcribing receipt {}", input.display_name());
        let raw = self.request(RECEIPT_PROMPT, input).await?;
        parse_structured(&raw)
    }

    async fn transcribe_statement(&self, input: &FileInput) -> Result<TranscribedStatements> {
        tracing::info!("Transcribing statement {}", input.display_name());
        let raw = self.request(STATEMENT_PROMPT, input).await?;
        parse_structured(&raw)
    }
}
