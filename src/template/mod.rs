//! Resolved templates and substitution tokens
//!
//! A [`Template`] is the output of applying a compiled plan to the bind
//! values captured at call time: an immutable skeleton string plus an ordered
//! substitution list. Substitutions are a closed tagged union so the renderer
//! can dispatch exhaustively.

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::dialect::SqlDialect;
use crate::schema::TableSchema;

/// One table-placeholder binding within a single template resolution.
///
/// Every placeholder occurrence referring to the same factory parameter
/// shares one token instance, so an alias declared for one occurrence is
/// observed by all of them. The alias cell doubles as the lazily cached
/// escaped table name for tokens that are never explicitly aliased.
#[derive(Debug)]
pub struct TableToken {
    table: Arc<TableSchema>,
    alias: OnceLock<String>,
}

impl TableToken {
    pub(crate) fn new(table: Arc<TableSchema>) -> Self {
        TableToken {
            table,
            alias: OnceLock::new(),
        }
    }

    pub fn table(&self) -> &TableSchema {
        &self.table
    }

    /// The alias set by the alias resolver, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.get().map(String::as_str)
    }

    /// Set the alias, or verify an identical re-declaration.
    ///
    /// Returns the previously set alias text on a conflicting declaration.
    pub(crate) fn declare_alias(&self, alias: &str) -> Result<(), String> {
        let current = self.alias.get_or_init(|| alias.to_string());
        if current == alias {
            Ok(())
        } else {
            Err(current.clone())
        }
    }

    /// The escaped alias, or the escaped table name (cached on first use).
    pub(crate) fn escaped_name_or_alias(&self, dialect: &dyn SqlDialect) -> &str {
        self.alias
            .get_or_init(|| crate::dialect::escape_to_string(dialect, self.table.table_name()))
    }
}

/// A substitution slot of a resolved template.
#[derive(Debug, Clone)]
pub enum Substitution {
    /// A table reference; renders as the token's alias.
    Table(Arc<TableToken>),
    /// A column reference; renders qualified or bare depending on format.
    Column {
        table: Arc<TableToken>,
        column: String,
    },
    /// Raw SQL text inserted verbatim, no escaping.
    Raw(String),
    /// An ordinary value that becomes a bound parameter.
    Value(Value),
}

impl Substitution {
    /// Human-readable kind for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Substitution::Table(_) => "table reference",
            Substitution::Column { .. } => "column reference",
            Substitution::Raw(_) => "raw fragment",
            Substitution::Value(_) => "value",
        }
    }
}

/// A resolved template: literal skeleton plus ordered substitutions.
#[derive(Debug, Clone)]
pub struct Template {
    skeleton: Arc<str>,
    substitutions: Vec<Substitution>,
}

impl Template {
    pub(crate) fn new(skeleton: Arc<str>, substitutions: Vec<Substitution>) -> Self {
        Template {
            skeleton,
            substitutions,
        }
    }

    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }
}
