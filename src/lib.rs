//! Sqlweave - parameterized SQL templates with structural fingerprint caching
//!
//! This crate lets a caller describe a SQL statement as a *template factory*:
//! a closure that receives typed table placeholders and returns a
//! [`TemplateDescription`] (a literal skeleton with `{index[,align][:format]}`
//! placeholders plus an ordered substitution list). The description is
//! analyzed once per structural shape - table and column references are
//! resolved against registered schemas and compiled into a rendering plan -
//! and the compiled plan is cached by a structural fingerprint, so two
//! factories built independently but with identical shape share one plan.
//!
//! ```
//! use sqlweave::{Environment, QueryBuilder, Table, TableParam, TableRegistry, TableSchema, TemplateDescription};
//! use std::sync::Arc;
//!
//! struct User;
//! impl Table for User {
//!     fn schema() -> TableSchema {
//!         TableSchema::new("users").column("id").column("name")
//!     }
//! }
//!
//! let tables = Arc::new(TableRegistry::new().register::<User>());
//! let env = Arc::new(Environment::default().with_tables(tables));
//! let builder = QueryBuilder::new(env);
//!
//! let query = builder.query1(|u: TableParam<User>| {
//!     TemplateDescription::new("SELECT {0:*} FROM {1} WHERE {2} = {3}")
//!         .table(u)
//!         .table(u)
//!         .column(u.col("id"))
//!         .bind(42)
//! });
//!
//! let command = query.to_command().unwrap();
//! assert_eq!(
//!     command.text(),
//!     r#"SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."id" = @p0"#
//! );
//! assert_eq!(command.parameters().len(), 1);
//! ```

pub mod dialect;
pub mod environment;
pub mod factory;
pub mod query;
pub mod render;
pub mod schema;
pub mod template;

mod errors;
mod utils;

pub use dialect::{AnsiDialect, SqlDialect};
pub use environment::{Environment, IdentityConverter, ValueConverter};
pub use errors::Error;
pub use factory::cache::{CacheMetrics, FactoryCache};
pub use factory::{ColumnParam, TableParam, TemplateDescription};
pub use query::{BoundParameter, Command, CommandSink, Query, QueryBuilder};
pub use schema::{Table, TableProvider, TableRegistry, TableSchema};
pub use template::{Substitution, TableToken, Template};
