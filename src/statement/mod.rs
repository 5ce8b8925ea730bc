//! Statement Cache Module
//!
//! Caches compiled statements per connection, keyed by whitespace-normalized
//! statement text.

mod cache;
mod normalize;

pub use cache::{StatementCache, StatementCompiler};
pub use normalize::normalize_sql;
