use thiserror::Error;

/// Errors raised while compiling a description into a rendering plan.
///
/// These are never cached as failures: a later call with corrected table
/// metadata may succeed.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("parameter of type `{type_name}` could not be resolved as a table (is it registered with the table provider?)")]
    UnresolvableTable { type_name: &'static str },
    #[error("member `{member}` of `{type_name}` could not be resolved as a column")]
    UnresolvableColumn {
        member: &'static str,
        type_name: &'static str,
    },
}
