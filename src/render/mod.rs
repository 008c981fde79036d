//! Template rendering
//!
//! Turns a resolved template into final command text plus bound parameters,
//! writing both into a [`CommandSink`](crate::query::CommandSink). Rendering
//! is a single left-to-right pass over the skeleton; placeholder syntax
//! errors report the byte offset they were found at.
//!
//! A template with no substitutions takes a fast path that only unescapes
//! doubled braces and never raises a syntax error, so pre-escaped literal SQL
//! passes through untouched.

pub(crate) mod alias;
pub mod errors;

mod format;
mod scan;

use serde_json::Value;

use crate::environment::Environment;
use crate::query::CommandSink;
use crate::render::errors::RenderError;
use crate::render::format::format_value;
use crate::render::scan::{parse_alias_format, parse_format_item};
use crate::template::{Substitution, Template};

pub(crate) fn render(
    template: &Template,
    sink: &mut dyn CommandSink,
    environment: &Environment,
) -> Result<(), RenderError> {
    let skeleton = template.skeleton();
    let substitutions = template.substitutions();
    let mut out = environment.text_buffer();

    if substitutions.is_empty() {
        unescape_braces(skeleton, &mut out);
        sink.set_text(&out);
        return Ok(());
    }

    let dialect = environment.dialect();
    let bytes = skeleton.as_bytes();
    let mut parameter_count = 0usize;
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                out.push_str(&skeleton[literal_start..i]);
                if i + 1 == bytes.len() {
                    return Err(RenderError::UnexpectedEnd);
                }
                if bytes[i + 1] == b'{' {
                    out.push('{');
                    i += 2;
                    literal_start = i;
                    continue;
                }

                let rest = &skeleton[i + 1..];
                let Some(item) = parse_format_item(rest) else {
                    return Err(if rest.contains('}') {
                        RenderError::MalformedPlaceholder { position: i }
                    } else {
                        RenderError::UnexpectedEnd
                    });
                };
                let substitution = substitutions.get(item.index).ok_or(
                    RenderError::IndexOutOfRange {
                        index: item.index,
                        count: substitutions.len(),
                    },
                )?;

                render_substitution(
                    substitution,
                    &item,
                    dialect,
                    environment,
                    &mut out,
                    &mut parameter_count,
                    sink,
                )?;

                i += 1 + item.len;
                literal_start = i;
            }
            b'}' => {
                out.push_str(&skeleton[literal_start..i]);
                if bytes.get(i + 1) != Some(&b'}') {
                    return Err(RenderError::UnmatchedCloseBrace { position: i });
                }
                out.push('}');
                i += 2;
                literal_start = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&skeleton[literal_start..]);

    sink.set_text(&out);
    Ok(())
}

fn render_substitution(
    substitution: &Substitution,
    item: &scan::FormatItem<'_>,
    dialect: &dyn crate::dialect::SqlDialect,
    environment: &Environment,
    out: &mut String,
    parameter_count: &mut usize,
    sink: &mut dyn CommandSink,
) -> Result<(), RenderError> {
    // Alignment only applies to values.
    if item.align.is_some() && !matches!(substitution, Substitution::Value(_)) {
        return Err(RenderError::AlignmentNotApplicable {
            kind: substitution.kind(),
            index: item.index,
        });
    }

    match substitution {
        Substitution::Table(token) => match item.format {
            None | Some("") => out.push_str(token.escaped_name_or_alias(dialect)),
            Some("*") => {
                let alias = token.escaped_name_or_alias(dialect);
                let mut first = true;
                for column in token.table().select_columns() {
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    out.push_str(alias);
                    out.push('.');
                    dialect.escape_identifier(column, out);
                }
            }
            Some(format) => match parse_alias_format(format) {
                Some((_, "")) => {
                    return Err(RenderError::InvalidTableFormat {
                        format: format.to_string(),
                        index: item.index,
                    });
                }
                Some((clause, _)) => {
                    dialect.escape_identifier(token.table().table_name(), out);
                    out.push(' ');
                    out.push_str(clause);
                }
                None => {
                    return Err(RenderError::InvalidTableFormat {
                        format: format.to_string(),
                        index: item.index,
                    });
                }
            },
        },
        Substitution::Column { table, column } => match item.format {
            None | Some("") | Some("T") => {
                out.push_str(table.escaped_name_or_alias(dialect));
                out.push('.');
                dialect.escape_identifier(column, out);
            }
            Some("C") => dialect.escape_identifier(column, out),
            Some(format) => {
                return Err(RenderError::InvalidColumnFormat {
                    format: format.to_string(),
                    index: item.index,
                });
            }
        },
        Substitution::Raw(sql) => {
            if let Some(format) = item.format {
                return Err(RenderError::FormatNotApplicable {
                    format: format.to_string(),
                    kind: substitution.kind(),
                    index: item.index,
                });
            }
            out.push_str(sql);
        }
        Substitution::Value(value) => {
            let bound = if item.align.is_some() || item.format.is_some() {
                Value::String(format_value(value, item.align, item.format)?)
            } else {
                value.clone()
            };
            let name = dialect.add_parameter(*parameter_count, out);
            *parameter_count += 1;
            sink.add_parameter(name, environment.converter().to_db(bound));
        }
    }
    Ok(())
}

/// Replace `{{` and `}}` with single braces; lone braces pass through.
fn unescape_braces(skeleton: &str, out: &mut String) {
    let bytes = skeleton.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if (bytes[i] == b'{' || bytes[i] == b'}') && bytes.get(i + 1) == Some(&bytes[i]) {
            out.push_str(&skeleton[literal_start..=i]);
            i += 2;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&skeleton[literal_start..]);
}
