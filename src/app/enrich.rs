use crate::domain::category::Category;
use crate::domain::model::{flexible_datetime, Receipt, ReceiptLineItem, ReconciledPair, Transaction};
use crate::domain::ports::Categorizer;
use crate::utils::error::{LinkerError, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A record with a category layered over it. The wrapped record is untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorized<T> {
    #[serde(flatten)]
    pub content: T,
    pub category: Category,
}

impl<T> Categorized<T> {
    pub fn new(content: T, category: Category) -> Self {
        Self { content, category }
    }
}

/// Receipt-shaped copy whose line items carry categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedReceipt {
    pub vendor: String,
    #[serde(with = "flexible_datetime")]
    pub datetime: NaiveDateTime,
    pub items: Vec<Categorized<ReceiptLineItem>>,
    pub subtotal: Decimal,
    pub grand_total: Decimal,
}

impl CategorizedReceipt {
    pub fn from_receipt(receipt: Receipt, categories: Vec<Category>) -> Result<Self> {
        if categories.len() != receipt.items.len() {
            return Err(LinkerError::ProcessingError {
                message: format!(
                    "{} categories for {} items on the {} receipt",
                    categories.len(),
                    receipt.items.len(),
                    receipt.vendor
                ),
            });
        }

        Ok(Self {
            items: receipt
                .items
                .into_iter()
                .zip(categories)
                .map(|(item, category)| Categorized::new(item, category))
                .collect(),
            vendor: receipt.vendor,
            datetime: receipt.datetime,
            subtotal: receipt.subtotal,
            grand_total: receipt.grand_total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedPair {
    pub transaction: Categorized<Transaction>,
    pub receipt: Option<CategorizedReceipt>,
}

pub struct EnrichmentStage<C: Categorizer> {
    categorizer: C,
}

impl<C: Categorizer> EnrichmentStage<C> {
    pub fn new(categorizer: C) -> Self {
        Self { categorizer }
    }

    /// Categorizes every pair in order. The first failure aborts the stage.
    pub async fn enrich(&self, pairs: Vec<ReconciledPair>) -> Result<Vec<CategorizedPair>> {
        let mut enriched = Vec::with_capacity(pairs.len());

        for (index, pair) in pairs.into_iter().enumerate() {
            tracing::debug!("Categorizing pair {} ('{}')", index + 1, pair.transaction.name);

            let category = self
                .categorizer
                .categorize_transaction(&pair.transaction, pair.receipt.as_ref())
                .await?;

            let receipt = match pair.receipt {
                Some(receipt) => {
                    let item_categories = self.categorizer.categorize_items(&receipt).await?;
                    Some(CategorizedReceipt::from_receipt(receipt, item_categories)?)
                }
                None => None,
            };

            enriched.push(CategorizedPair {
                transaction: Categorized::new(pair.transaction, category),
                receipt,
            });
        }

        Ok(enriched)
    }
}
