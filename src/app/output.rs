use crate::app::enrich::CategorizedPair;
use crate::domain::model::{ReconciledPair, Transaction};
use crate::domain::ports::Storage;
use crate::utils::error::{LinkerError, Result};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinkedPair {
    Plain(ReconciledPair),
    Categorized(CategorizedPair),
}

impl LinkedPair {
    pub fn transaction(&self) -> &Transaction {
        match self {
            LinkedPair::Plain(pair) => &pair.transaction,
            LinkedPair::Categorized(pair) => &pair.transaction.content,
        }
    }

    pub fn is_matched(&self) -> bool {
        match self {
            LinkedPair::Plain(pair) => pair.receipt.is_some(),
            LinkedPair::Categorized(pair) => pair.receipt.is_some(),
        }
    }
}

/// A pair as written out, with an identifier minted at write time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub pair: LinkedPair,
}

impl OutputRecord {
    pub fn assign_ids(pairs: Vec<LinkedPair>) -> Vec<OutputRecord> {
        pairs
            .into_iter()
            .map(|pair| OutputRecord {
                id: Uuid::new_v4(),
                pair,
            })
            .collect()
    }
}

pub fn to_json(records: &[OutputRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

pub const CSV_HEADER: [&str; 8] = [
    "id",
    "datetime",
    "name",
    "withdrawal_amount",
    "deposit_amount",
    "receipt_vendor",
    "receipt_grand_total",
    "category",
];

/// One row per pair. Unmatched pairs leave the receipt columns empty.
pub fn to_csv(records: &[OutputRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let transaction = record.pair.transaction();
        let (vendor, total, category) = match &record.pair {
            LinkedPair::Plain(pair) => (
                pair.receipt.as_ref().map(|r| r.vendor.clone()),
                pair.receipt.as_ref().map(|r| r.grand_total.to_string()),
                None,
            ),
            LinkedPair::Categorized(pair) => (
                pair.receipt.as_ref().map(|r| r.vendor.clone()),
                pair.receipt.as_ref().map(|r| r.grand_total.to_string()),
                Some(pair.transaction.category.label().to_string()),
            ),
        };

        writer.write_record([
            record.id.to_string(),
            transaction.datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
            transaction.name.clone(),
            transaction.withdrawal_amount.map(|a| a.to_string()).unwrap_or_default(),
            transaction.deposit_amount.map(|a| a.to_string()).unwrap_or_default(),
            vendor.unwrap_or_default(),
            total.unwrap_or_default(),
            category.unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| LinkerError::IoError(e.into_error()))
}

pub struct OutputWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> OutputWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write_json(&self, path: &str, records: &[OutputRecord]) -> Result<()> {
        let data = to_json(records)?;
        self.storage.write_file(path, &data).await?;
        tracing::info!("Wrote {} linked transactions to {}", records.len(), path);
        Ok(())
    }

    pub async fn write_csv(&self, path: &str, records: &[OutputRecord]) -> Result<()> {
        let data = to_csv(records)?;
        self.storage.write_file(path, &data).await?;
        tracing::info!("Wrote CSV summary to {}", path);
        Ok(())
    }
}
