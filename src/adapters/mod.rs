// Adapters layer: concrete implementations for external systems (inference, storage).

pub mod categorizer;
pub mod inference;
pub mod storage;
pub mod transcriber;
pub mod vendor_matcher;

pub use categorizer::LlmCategorizer;
pub use inference::HttpInferenceClient;
pub use storage::LocalStorage;
pub use transcriber::LlmTranscriber;
pub use vendor_matcher::LlmVendorMatcher;
