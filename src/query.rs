//! Queries and the command boundary
//!
//! A [`Query`] pairs an environment with either plain SQL text or a template
//! description produced by a factory. Populating a query writes the final
//! command text and bound parameters into a [`CommandSink`]; [`Command`] is
//! the built-in sink for callers that just want the text and parameter list.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::environment::Environment;
use crate::errors::Error;
use crate::factory::{TableParam, TemplateDescription};
use crate::render;
use crate::schema::Table;

/// Receives the rendered command text and its parameters.
///
/// `set_text` is called exactly once per successful populate, after all
/// `add_parameter` calls.
pub trait CommandSink {
    fn set_text(&mut self, text: &str);
    fn add_parameter(&mut self, name: String, value: Value);
}

/// One bound parameter of a rendered command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    pub name: String,
    pub value: Value,
}

/// A rendered command: final SQL text plus parameters in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Command {
    text: String,
    parameters: Vec<BoundParameter>,
}

impl Command {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }
}

impl CommandSink for Command {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn add_parameter(&mut self, name: String, value: Value) {
        self.parameters.push(BoundParameter { name, value });
    }
}

enum QuerySource {
    /// Plain SQL text, passed through verbatim (no placeholder grammar).
    Plain(String),
    /// A factory's description, resolved through the plan cache.
    Factory(Arc<TemplateDescription>),
}

/// A query bound to its environment, ready to populate a sink.
pub struct Query {
    environment: Arc<Environment>,
    source: QuerySource,
}

impl Query {
    /// Write the command text and parameters into `sink`.
    pub fn populate(&self, sink: &mut dyn CommandSink) -> Result<(), Error> {
        match &self.source {
            QuerySource::Plain(text) => {
                sink.set_text(text);
                Ok(())
            }
            QuerySource::Factory(description) => {
                let environment = self.environment.as_ref();
                let template = environment.cache().resolve(description, environment)?;
                render::alias::resolve_aliases(&template, environment)?;
                render::render(&template, sink, environment)?;
                Ok(())
            }
        }
    }

    /// Populate a fresh [`Command`].
    pub fn to_command(&self) -> Result<Command, Error> {
        let mut command = Command::default();
        self.populate(&mut command)?;
        Ok(command)
    }
}

/// Entry point for building queries against one environment.
#[derive(Clone)]
pub struct QueryBuilder {
    environment: Arc<Environment>,
}

impl QueryBuilder {
    pub fn new(environment: Arc<Environment>) -> Self {
        QueryBuilder { environment }
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// A plain-text query. The text is used verbatim; braces have no special
    /// meaning here.
    pub fn sql(&self, text: impl Into<String>) -> Query {
        Query {
            environment: self.environment.clone(),
            source: QuerySource::Plain(text.into()),
        }
    }

    fn factory(&self, description: TemplateDescription) -> Query {
        Query {
            environment: self.environment.clone(),
            source: QuerySource::Factory(Arc::new(description)),
        }
    }

    /// A template factory with no table parameters.
    pub fn query0<F>(&self, factory: F) -> Query
    where
        F: FnOnce() -> TemplateDescription,
    {
        self.factory(factory())
    }

    /// A template factory over one table parameter.
    pub fn query1<T1, F>(&self, factory: F) -> Query
    where
        T1: Table,
        F: FnOnce(TableParam<T1>) -> TemplateDescription,
    {
        self.factory(factory(TableParam::new(0)))
    }

    /// A template factory over two table parameters.
    pub fn query2<T1, T2, F>(&self, factory: F) -> Query
    where
        T1: Table,
        T2: Table,
        F: FnOnce(TableParam<T1>, TableParam<T2>) -> TemplateDescription,
    {
        self.factory(factory(TableParam::new(0), TableParam::new(1)))
    }

    /// A template factory over three table parameters.
    pub fn query3<T1, T2, T3, F>(&self, factory: F) -> Query
    where
        T1: Table,
        T2: Table,
        T3: Table,
        F: FnOnce(TableParam<T1>, TableParam<T2>, TableParam<T3>) -> TemplateDescription,
    {
        self.factory(factory(
            TableParam::new(0),
            TableParam::new(1),
            TableParam::new(2),
        ))
    }

    /// A template factory over four table parameters.
    pub fn query4<T1, T2, T3, T4, F>(&self, factory: F) -> Query
    where
        T1: Table,
        T2: Table,
        T3: Table,
        T4: Table,
        F: FnOnce(
            TableParam<T1>,
            TableParam<T2>,
            TableParam<T3>,
            TableParam<T4>,
        ) -> TemplateDescription,
    {
        self.factory(factory(
            TableParam::new(0),
            TableParam::new(1),
            TableParam::new(2),
            TableParam::new(3),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_sql_is_verbatim() {
        let builder = QueryBuilder::new(Arc::new(Environment::default()));
        let command = builder
            .sql("SELECT * FROM t WHERE tag = '{not a placeholder}'")
            .to_command()
            .unwrap();
        assert_eq!(
            command.text(),
            "SELECT * FROM t WHERE tag = '{not a placeholder}'"
        );
        assert!(command.parameters().is_empty());
    }

    #[test]
    fn test_query0_renders_through_the_cache() {
        let env = Arc::new(Environment::default());
        let builder = QueryBuilder::new(env.clone());

        let command = builder
            .query0(|| TemplateDescription::new("SELECT {0}").bind(1))
            .to_command()
            .unwrap();
        assert_eq!(command.text(), "SELECT @p0");
        assert_eq!(env.cache().metrics().entries, 1);
    }

    #[test]
    fn test_compile_error_surfaces_as_error() {
        use crate::schema::TableSchema;

        struct Unregistered;
        impl Table for Unregistered {
            fn schema() -> TableSchema {
                TableSchema::new("unregistered")
            }
        }

        let builder = QueryBuilder::new(Arc::new(Environment::default()));
        let err = builder
            .query1(|t: TableParam<Unregistered>| {
                TemplateDescription::new("SELECT {0}").table(t)
            })
            .to_command()
            .unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }
}
