//! Alias resolution
//!
//! A full pass over the skeleton that runs before rendering. Every `AS`
//! table format declares its alias text on the referenced table token, so a
//! column reference that appears *before* the aliasing placeholder still
//! renders qualified with the alias. Tables that never get an explicit alias
//! fall back to their escaped table name when first rendered.
//!
//! The pass only acts on well-formed `AS` placeholders; syntax errors and
//! out-of-range indexes are left for the renderer, which reports them with
//! positions. An `AS` format aimed at anything other than a table reference
//! is an error here: silently skipping it would leave the alias undeclared
//! and render misleading SQL.

use crate::dialect::escape_to_string;
use crate::environment::Environment;
use crate::render::errors::RenderError;
use crate::render::scan::{parse_alias_format, parse_format_item};
use crate::template::{Substitution, Template};

pub(crate) fn resolve_aliases(
    template: &Template,
    environment: &Environment,
) -> Result<(), RenderError> {
    let skeleton = template.skeleton();
    let substitutions = template.substitutions();
    let bytes = skeleton.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'{') {
            i += 2;
            continue;
        }

        let Some(item) = parse_format_item(&skeleton[i + 1..]) else {
            i += 1;
            continue;
        };
        i += 1 + item.len;

        let Some((_, alias_text)) = item.format.and_then(parse_alias_format) else {
            continue;
        };
        let Some(substitution) = substitutions.get(item.index) else {
            continue;
        };

        let Substitution::Table(token) = substitution else {
            return Err(RenderError::FormatNotApplicable {
                format: item.format.unwrap_or_default().to_string(),
                kind: substitution.kind(),
                index: item.index,
            });
        };

        let declared = if alias_text.is_empty() {
            escape_to_string(environment.dialect(), token.table().table_name())
        } else {
            alias_text.to_string()
        };
        token
            .declare_alias(&declared)
            .map_err(|existing| RenderError::AliasConflict {
                declared,
                existing,
                table: token.table().table_name().to_string(),
            })?;
    }

    Ok(())
}
