pub use ts2hx_core::Unsupported;

/// Result of translating one construct. An `Err` abandons the file being translated.
pub type Translated<T> = Result<T, Unsupported>;
