// Application layer: stages layered after reconciliation.

pub mod enrich;
pub mod output;
