use std::sync::Arc;

use sqlweave::{Environment, QueryBuilder, Table, TableRegistry, TableSchema};

pub struct Table1;

impl Table for Table1 {
    fn schema() -> TableSchema {
        TableSchema::new("Table1")
            .column("Id")
            .column_as("ColumnName", "FooColumn")
            .column("NullableField")
    }
}

pub struct Table2;

impl Table for Table2 {
    fn schema() -> TableSchema {
        TableSchema::new("TableTwo").column("Id")
    }
}

pub fn environment() -> Arc<Environment> {
    let _ = env_logger::builder().is_test(true).try_init();

    let tables = Arc::new(
        TableRegistry::new()
            .register::<Table1>()
            .register::<Table2>(),
    );
    Arc::new(Environment::default().with_tables(tables))
}

pub fn builder() -> QueryBuilder {
    QueryBuilder::new(environment())
}
