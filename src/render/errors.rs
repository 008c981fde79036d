use thiserror::Error;

/// Errors raised while resolving aliases or rendering a template.
///
/// Positions are byte offsets into the skeleton. Indexes are the 0-based
/// placeholder indexes as written in the template.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("unterminated '{{' at the end of the template")]
    UnexpectedEnd,
    #[error("malformed placeholder at byte {position}")]
    MalformedPlaceholder { position: usize },
    #[error("unmatched '}}' at byte {position} (write '}}}}' for a literal brace)")]
    UnmatchedCloseBrace { position: usize },
    #[error("placeholder index {index} is out of range for {count} substitution(s)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("alignment is not applicable to a {kind} (placeholder {index})")]
    AlignmentNotApplicable { kind: &'static str, index: usize },
    #[error("invalid format `{format}` for table reference placeholder {index}")]
    InvalidTableFormat { format: String, index: usize },
    #[error("invalid format `{format}` for column reference placeholder {index}")]
    InvalidColumnFormat { format: String, index: usize },
    #[error("format `{format}` is not applicable to a {kind} (placeholder {index})")]
    FormatNotApplicable {
        format: String,
        kind: &'static str,
        index: usize,
    },
    #[error("alias `{declared}` conflicts with alias `{existing}` already declared for table `{table}`")]
    AliasConflict {
        declared: String,
        existing: String,
        table: String,
    },
    #[error("invalid value format `{format}`")]
    InvalidValueFormat { format: String },
}
