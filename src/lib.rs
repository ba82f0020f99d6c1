//! Links bank statement transactions to purchase receipts and optionally
//! categorizes the result.
//!
//! Transcription and categorization are delegated to an external inference
//! service; [`ReconciliationEngine`] holds the matching logic.

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{HttpInferenceClient, LlmCategorizer, LlmTranscriber, LlmVendorMatcher, LocalStorage};
pub use app::enrich::{Categorized, CategorizedPair, CategorizedReceipt, EnrichmentStage};
pub use app::output::{LinkedPair, OutputRecord};
pub use core::linker::{LinkOptions, LinkReport, Linker};
pub use core::reconcile::ReconciliationEngine;
pub use domain::category::{Category, CategorySet};
pub use domain::input::FileInput;
pub use domain::model::{
    Receipt, ReceiptLineItem, ReconciledPair, Transaction, TranscribedStatement,
    TranscribedStatements,
};
pub use utils::error::{InferenceError, LinkerError, Result};
