//! Value formatting
//!
//! A value placeholder may carry an alignment and a format. Formatting never
//! inlines the value into the SQL text: the formatted result is bound as a
//! string parameter. Numeric formats are a small fixed set (`X`/`x` hex,
//! `D`/`d` decimal, `F`/`f` fixed-point, each with an optional width);
//! non-numeric values ignore the format and use their display form.

use serde_json::Value;

use crate::render::errors::RenderError;

/// Format a value for binding. Called only when an alignment or format is
/// present; unformatted values are bound untouched.
pub(super) fn format_value(
    value: &Value,
    align: Option<isize>,
    format: Option<&str>,
) -> Result<String, RenderError> {
    let text = match format {
        Some(spec) if !spec.is_empty() => match value {
            Value::Number(number) => format_number(number, spec)?,
            other => display_value(other),
        },
        _ => display_value(value),
    };
    Ok(match align {
        Some(align) => apply_alignment(&text, align),
        None => text,
    })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_number(number: &serde_json::Number, spec: &str) -> Result<String, RenderError> {
    let invalid = || RenderError::InvalidValueFormat {
        format: spec.to_string(),
    };

    let letter = spec.chars().next().ok_or_else(invalid)?;
    let width: usize = match &spec[letter.len_utf8()..] {
        "" => 0,
        digits => digits.parse().map_err(|_| invalid())?,
    };

    match letter {
        'X' | 'x' => {
            // Negative integers render as their 64-bit two's complement.
            let bits = match (number.as_u64(), number.as_i64()) {
                (Some(unsigned), _) => unsigned,
                (None, Some(signed)) => signed as u64,
                (None, None) => return Err(invalid()),
            };
            Ok(if letter == 'X' {
                format!("{bits:0width$X}")
            } else {
                format!("{bits:0width$x}")
            })
        }
        'D' | 'd' => {
            let signed = match (number.as_i64(), number.as_u64()) {
                (Some(signed), _) => signed as i128,
                (None, Some(unsigned)) => unsigned as i128,
                (None, None) => return Err(invalid()),
            };
            let magnitude = signed.unsigned_abs();
            Ok(if signed < 0 {
                format!("-{magnitude:0width$}")
            } else {
                format!("{magnitude:0width$}")
            })
        }
        'F' | 'f' => {
            let float = number.as_f64().ok_or_else(invalid)?;
            let precision = if spec.len() > 1 { width } else { 2 };
            Ok(format!("{float:.precision$}"))
        }
        _ => Err(invalid()),
    }
}

/// Pad to the alignment width with spaces; positive aligns right, negative
/// aligns left. Width counts characters, not bytes.
fn apply_alignment(text: &str, align: isize) -> String {
    let width = align.unsigned_abs();
    let length = text.chars().count();
    if length >= width {
        return text.to_string();
    }
    let padding = " ".repeat(width - length);
    if align > 0 {
        format!("{padding}{text}")
    } else {
        format!("{text}{padding}")
    }
}
