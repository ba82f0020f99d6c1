pub mod linker;
pub mod reconcile;

pub use crate::domain::model::{Receipt, ReconciledPair, Transaction};
pub use crate::domain::ports::{Categorizer, Storage, Transcriber, VendorMatcher};
pub use crate::utils::error::Result;
