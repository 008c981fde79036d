//! Table metadata and the table-provider boundary
//!
//! The factory compiler resolves table placeholders and member accesses
//! through a [`TableProvider`]. The provider is a boundary trait: anything
//! that can map a Rust type to a [`TableSchema`] works. The default
//! implementation is an explicit registry - types declare their schema via
//! the [`Table`] trait and are registered up front. Convention- or
//! attribute-based discovery is deliberately out of scope.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// A type that maps to a database table.
pub trait Table: 'static {
    fn schema() -> TableSchema;
}

/// One column of a table: the declared member name and the column it maps to.
#[derive(Debug, Clone)]
struct TableColumn {
    member: String,
    column: String,
}

/// Table metadata: name, ordered select-column list, member-to-column lookup.
#[derive(Debug, Clone)]
pub struct TableSchema {
    table_name: String,
    columns: Vec<TableColumn>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>) -> Self {
        TableSchema {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Declare a column whose member name and column name coincide.
    pub fn column(self, name: &str) -> Self {
        self.column_as(name, name)
    }

    /// Declare a column whose member name differs from the column name.
    pub fn column_as(mut self, member: &str, column: &str) -> Self {
        self.columns.push(TableColumn {
            member: member.to_string(),
            column: column.to_string(),
        });
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Column names in declaration order, used for `{n:*}` expansion.
    pub fn select_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.column.as_str())
    }

    /// Resolve a declared member name to its column name.
    pub fn column_for_member(&self, member: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.member == member)
            .map(|c| c.column.as_str())
    }
}

/// Maps a table placeholder's type to its schema.
pub trait TableProvider: Send + Sync {
    fn table_for(&self, ty: TypeId) -> Option<Arc<TableSchema>>;
}

/// Explicit type-to-schema registry, the default [`TableProvider`].
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<TypeId, Arc<TableSchema>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        TableRegistry::default()
    }

    pub fn register<T: Table>(mut self) -> Self {
        self.tables
            .insert(TypeId::of::<T>(), Arc::new(T::schema()));
        self
    }
}

impl TableProvider for TableRegistry {
    fn table_for(&self, ty: TypeId) -> Option<Arc<TableSchema>> {
        self.tables.get(&ty).cloned()
    }
}
