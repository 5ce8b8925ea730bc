//! Statement Cache Module
//!
//! Reuses compiled statement handles keyed by normalized statement text.

use std::fmt;

use tracing::debug;

use crate::cache::{BoundedCache, CacheStats, Counters, EvictionListener};
use crate::error::Result;
use crate::statement::normalize_sql;

// == Statement Compiler ==
/// The store that turns statement text into an executable handle, typically
/// one database connection.
pub trait StatementCompiler {
    /// Compiled handle. Cloning must be cheap and keep the identity of the
    /// cached handle (e.g. an `Arc`).
    type Statement: Clone;
    /// Compilation failure, returned to callers untouched.
    type Error;

    fn compile(&mut self, sql: &str) -> std::result::Result<Self::Statement, Self::Error>;
}

// == Statement Cache ==
/// LRU cache of compiled statements in front of a [`StatementCompiler`].
pub struct StatementCache<C: StatementCompiler> {
    compiler: C,
    statements: BoundedCache<C::Statement>,
    /// Kept apart from the inner cache: failed compiles count as neither
    counters: Counters,
}

impl<C: StatementCompiler> StatementCache<C> {
    // == Constructor ==
    /// Creates a statement cache holding at most `capacity` compiled statements.
    pub fn new(compiler: C, capacity: usize) -> Result<Self> {
        Ok(Self {
            compiler,
            statements: BoundedCache::new(capacity)?,
            counters: Counters::default(),
        })
    }

    /// Notified with each statement dropped to make room, e.g. to finalize it.
    pub fn with_listener(mut self, listener: impl EvictionListener<C::Statement> + 'static) -> Self {
        self.statements.set_listener(listener);
        self
    }

    // == Prepare ==
    /// Returns the compiled statement for `sql`, compiling it on first use.
    ///
    /// Statements differing only in whitespace share one entry. The compiler
    /// always receives the caller's text; only the lookup key is normalized.
    /// A compile error is returned as-is and leaves the cache and counters
    /// unchanged.
    pub fn prepare(&mut self, sql: &str) -> std::result::Result<C::Statement, C::Error> {
        let key = normalize_sql(sql);

        if let Some(statement) = self.statements.get(&key) {
            self.counters.record_hit();
            return Ok(statement.clone());
        }

        let statement = self.compiler.compile(sql)?;
        self.counters.record_miss();
        debug!("Compiled statement: {}", key);
        self.statements.set(key, statement.clone());
        Ok(statement)
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.statements.len())
    }

    // == Clear ==
    /// Drops every cached statement and resets the counters.
    pub fn clear(&mut self) {
        self.statements.clear();
        self.counters.reset();
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn compiler_mut(&mut self) -> &mut C {
        &mut self.compiler
    }
}

impl<C: StatementCompiler> fmt::Debug for StatementCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementCache")
            .field("statements", &self.statements)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
