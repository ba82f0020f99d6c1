use crate::domain::ports::{parse_structured, InferenceClient, InferenceRequest, VendorMatcher};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You compare merchant names from receipts and bank statements. \
Statement names are often truncated, upper-cased or carry store numbers and payment \
processor prefixes (e.g. 'SQ *', 'TST*'). Answer only with JSON of the form \
{\"same_vendor\": true} or {\"same_vendor\": false}.";

#[derive(Debug, Deserialize)]
struct Verdict {
    same_vendor: bool,
}

/// Asks a text model whether two merchant strings name the same business.
pub struct LlmVendorMatcher {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl LlmVendorMatcher {
    pub fn new(client: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn prompt(receipt_vendor: &str, transaction_name: &str) -> String {
        format!(
            "Do these refer to the same merchant?\nReceipt vendor: {}\nStatement transaction name: {}",
            receipt_vendor, transaction_name
        )
    }
}

#[async_trait]
impl VendorMatcher for LlmVendorMatcher {
    async fn matches(&self, receipt_vendor: &str, transaction_name: &str) -> Result<bool> {
        let request = InferenceRequest::new(&self.model, Self::prompt(receipt_vendor, transaction_name))
            .with_system(SYSTEM_PROMPT);

        let raw = self.client.complete(request).await?;
        let verdict: Verdict = parse_structured(&raw)?;

        tracing::debug!(
            "Vendor check '{}' vs '{}': {}",
            receipt_vendor,
            transaction_name,
            verdict.same_vendor
        );
        Ok(verdict.same_vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::inference::HttpInferenceClient;
    use crate::utils::error::{InferenceError, LinkerError};
    use httpmock::prelude::*;
    use serde_json::json;

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "content": content } }] })
    }

    #[tokio::test]
    async fn test_matches_reads_verdict() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_contains("Receipt vendor: Starbucks")
                .body_contains("Statement transaction name: STARBUCKS #12");
            then.status(200).json_body(completion("{\"same_vendor\": true}"));
        });

        let client = Arc::new(HttpInferenceClient::new(&server.base_url(), None, 5).unwrap());
        let matcher = LlmVendorMatcher::new(client, "gemini-2.5-flash");

        assert!(matcher.matches("Starbucks", "STARBUCKS #12").await.unwrap());
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_unexpected_answer_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("{\"same_vendor\": \"probably\"}"));
        });

        let client = Arc::new(HttpInferenceClient::new(&server.base_url(), None, 5).unwrap());
        let matcher = LlmVendorMatcher::new(client, "gemini-2.5-flash");

        let err = matcher.matches("CVS", "CVS/PHARMACY #0231").await.unwrap_err();
        assert!(matches!(
            err,
            LinkerError::InferenceError(InferenceError::MalformedResponse { .. })
        ));
    }
}
