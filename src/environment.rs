//! Query environment
//!
//! An [`Environment`] bundles everything rendering needs: the SQL dialect,
//! the table provider, the bind-value converter, the plan cache and the
//! scratch pools. Environments are cheap to share behind an `Arc`; the
//! `with_*` builders derive a new environment with a fresh cache because a
//! cached plan embeds resolutions made under the old configuration.

use std::sync::Arc;

use serde_json::Value;

use crate::dialect::{AnsiDialect, SqlDialect};
use crate::factory::cache::FactoryCache;
use crate::factory::walker::HashCollector;
use crate::schema::{TableProvider, TableRegistry};
use crate::utils::pool::{PoolGuard, ScratchPool};

/// Converts bind values before they are handed to the command sink.
///
/// The default keeps values as-is; a driver-specific converter can map them
/// onto whatever its parameter types need.
pub trait ValueConverter: Send + Sync {
    fn to_db(&self, value: Value) -> Value {
        value
    }
}

/// The no-op converter.
pub struct IdentityConverter;

impl ValueConverter for IdentityConverter {}

pub struct Environment {
    dialect: Arc<dyn SqlDialect>,
    tables: Arc<dyn TableProvider>,
    converter: Arc<dyn ValueConverter>,
    cache: FactoryCache,
    walk_scratch: ScratchPool<HashCollector>,
    buffers: ScratchPool<String>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(
            Arc::new(AnsiDialect),
            Arc::new(TableRegistry::new()),
            Arc::new(IdentityConverter),
        )
    }
}

impl Environment {
    fn new(
        dialect: Arc<dyn SqlDialect>,
        tables: Arc<dyn TableProvider>,
        converter: Arc<dyn ValueConverter>,
    ) -> Self {
        Environment {
            dialect,
            tables,
            converter,
            cache: FactoryCache::default(),
            walk_scratch: ScratchPool::new(),
            buffers: ScratchPool::new(),
        }
    }

    /// Derive an environment with a different dialect and an empty cache.
    pub fn with_dialect(&self, dialect: Arc<dyn SqlDialect>) -> Environment {
        Environment::new(dialect, self.tables.clone(), self.converter.clone())
    }

    /// Derive an environment with a different table provider and an empty
    /// cache.
    pub fn with_tables(&self, tables: Arc<dyn TableProvider>) -> Environment {
        Environment::new(self.dialect.clone(), tables, self.converter.clone())
    }

    /// Derive an environment with a different value converter and an empty
    /// cache.
    pub fn with_converter(&self, converter: Arc<dyn ValueConverter>) -> Environment {
        Environment::new(self.dialect.clone(), self.tables.clone(), converter)
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn tables(&self) -> &dyn TableProvider {
        self.tables.as_ref()
    }

    pub fn converter(&self) -> &dyn ValueConverter {
        self.converter.as_ref()
    }

    pub fn cache(&self) -> &FactoryCache {
        &self.cache
    }

    pub(crate) fn walk_scratch(&self) -> PoolGuard<'_, HashCollector> {
        self.walk_scratch.acquire()
    }

    pub(crate) fn text_buffer(&self) -> PoolGuard<'_, String> {
        self.buffers.acquire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Table, TableSchema};
    use std::any::TypeId;

    struct Users;
    impl Table for Users {
        fn schema() -> TableSchema {
            TableSchema::new("users").column("id")
        }
    }

    #[test]
    fn test_default_environment_has_no_tables() {
        let env = Environment::default();
        assert!(env.tables().table_for(TypeId::of::<Users>()).is_none());
    }

    #[test]
    fn test_with_tables_keeps_dialect_and_converter() {
        let env = Environment::default()
            .with_tables(Arc::new(TableRegistry::new().register::<Users>()));
        assert!(env.tables().table_for(TypeId::of::<Users>()).is_some());
        assert_eq!(crate::dialect::escape_to_string(env.dialect(), "a"), "\"a\"");
    }

    #[test]
    fn test_derived_environment_starts_with_an_empty_cache() {
        let env = Environment::default();
        let derived = env.with_converter(Arc::new(IdentityConverter));
        assert_eq!(derived.cache().metrics().entries, 0);
    }
}
