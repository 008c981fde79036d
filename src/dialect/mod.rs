//! Identifier escaping and parameter naming
//!
//! The dialect decides how identifiers are quoted and how parameter
//! placeholders appear in the command text. The default methods implement the
//! ANSI behavior (double-quoted identifiers, `@p<N>` parameters); a custom
//! dialect overrides whichever method differs.

/// Pluggable identifier-escaping and parameter-naming strategy.
pub trait SqlDialect: Send + Sync {
    /// Append `identifier` to `destination` as an escaped SQL identifier.
    fn escape_identifier(&self, identifier: &str, destination: &mut String) {
        destination.push('"');
        for ch in identifier.chars() {
            if ch == '"' {
                destination.push('"');
            }
            destination.push(ch);
        }
        destination.push('"');
    }

    /// Append a placeholder for the parameter at `parameter_index` to
    /// `query_destination` and return the parameter name to bind it under.
    fn add_parameter(&self, parameter_index: usize, query_destination: &mut String) -> String {
        let name = format!("@p{parameter_index}");
        query_destination.push_str(&name);
        name
    }
}

/// The default dialect: double-quoted identifiers with embedded quotes
/// doubled, `@p<N>` parameter placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiDialect;

impl SqlDialect for AnsiDialect {}

/// Escape an identifier into a fresh string.
pub(crate) fn escape_to_string(dialect: &dyn SqlDialect, identifier: &str) -> String {
    let mut escaped = String::with_capacity(identifier.len() + 2);
    dialect.escape_identifier(identifier, &mut escaped);
    escaped
}
