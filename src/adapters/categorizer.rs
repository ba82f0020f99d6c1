use crate::domain::category::{Category, CategorySet};
use crate::domain::model::{Receipt, Transaction};
use crate::domain::ports::{parse_structured, Categorizer, InferenceClient, InferenceRequest};
use crate::utils::error::{InferenceError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SingleCategory {
    category: String,
}

#[derive(Debug, Deserialize)]
struct ItemCategories {
    categories: Vec<String>,
}

pub struct LlmCategorizer {
    client: Arc<dyn InferenceClient>,
    model: String,
    categories: CategorySet,
    notes: Option<String>,
}

impl LlmCategorizer {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        model: impl Into<String>,
        categories: CategorySet,
        notes: Option<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            categories,
            notes,
        }
    }

    fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You assign personal spending categories. Use exactly one of these labels: {}.",
            self.categories.labels().join(", ")
        );
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            prompt.push_str("\nAdditional notes from the user: ");
            prompt.push_str(notes.trim());
        }
        prompt.push_str("\nAnswer with JSON only.");
        prompt
    }

    fn resolve(&self, raw: &str) -> Category {
        let category = self.categories.resolve(raw);
        if category == Category::Uncategorized {
            tracing::warn!("Model answered with unknown category '{}'", raw);
        }
        category
    }
}

#[async_trait]
impl Categorizer for LlmCategorizer {
    async fn categorize_transaction(
        &self,
        transaction: &Transaction,
        receipt: Option<&Receipt>,
    ) -> Result<Category> {
        let mut prompt = format!(
            "Categorize this bank transaction. Respond as {{\"category\": \"LABEL\"}}.\nName: {}\nDate: {}",
            transaction.name, transaction.datetime
        );
        if let Some(amount) = transaction.withdrawal_amount {
            prompt.push_str(&format!("\nWithdrawal: {}", amount));
        }
        if let Some(amount) = transaction.deposit_amount {
            prompt.push_str(&format!("\nDeposit: {}", amount));
        }
        if let Some(receipt) = receipt {
            let items: Vec<&str> = receipt.items.iter().map(|i| i.name.as_str()).collect();
            prompt.push_str(&format!(
                "\nMatching receipt from {} with items: {}",
                receipt.vendor,
                items.join(", ")
            ));
        }

        let request = InferenceRequest::new(&self.model, prompt).with_system(self.system_prompt());
        let raw = self.client.complete(request).await?;
        let answer: SingleCategory = parse_structured(&raw)?;
        Ok(self.resolve(&answer.category))
    }

    async fn categorize_items(&self, receipt: &Receipt) -> Result<Vec<Category>> {
        if receipt.items.is_empty() {
            return Ok(Vec::new());
        }

        let lines: Vec<String> = receipt
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {} x{} @ {}", i + 1, item.name, item.quantity, item.price))
            .collect();
        let prompt = format!(
            "Categorize each line item of this receipt from {}. Respond as \
             {{\"categories\": [\"LABEL\", ...]}} with exactly {} labels in item order.\n{}",
            receipt.vendor,
            receipt.items.len(),
            lines.join("\n")
        );

        let request = InferenceRequest::new(&self.model, prompt).with_system(self.system_prompt());
        let raw = self.client.complete(request).await?;
        let answer: ItemCategories = parse_structured(&raw)?;

        if answer.categories.len() != receipt.items.len() {
            return Err(InferenceError::MalformedResponse {
                message: format!(
                    "Expected {} item categories, got {}",
                    receipt.items.len(),
                    answer.categories.len()
                ),
            }
            .into());
        }

        Ok(answer.categories.iter().map(|c| self.resolve(c)).collect())
    }
}
