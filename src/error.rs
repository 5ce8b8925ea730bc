//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Only configuration errors originate here. Failures of wrapped computations
//! (query computations, statement compilation) keep their own error types and
//! are handed back to the caller untouched.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity below the minimum of one entry
    #[error("Invalid capacity: {0} (a cache must hold at least 1 entry)")]
    InvalidCapacity(usize),
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;
