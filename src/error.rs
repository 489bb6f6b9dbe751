//! Error kinds surfaced by maps and sets.

/// Errors raised by [`Map`](crate::Map) and [`Set`](crate::Set) operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed construction or configuration argument. Raised at the call
    /// that supplied it, before any state changes.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// `query` on a map whose missing-key policy is `throw` found no entry.
    /// Carries the digest of the normalized key.
    #[error("missing key (digest {digest})")]
    MissingKey { digest: String },
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;
