//! Loose JavaScript literal normalisation.
//!
//! Alert markers are embedded as JS object/array literals, which are close to
//! JSON but not quite. Normalisation rules, applied in one scan:
//!
//! - bare identifier keys are quoted: `{lat: 1}` -> `{"lat": 1}`
//! - single-quoted strings become double-quoted; inner `"` is escaped and
//!   `\'` is unescaped
//! - raw newline, carriage return and tab inside strings are escaped
//! - `undefined` becomes `null`
//! - trailing commas before `]` or `}` are dropped
//!
//! The result is handed to `serde_json`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiteralError {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid literal: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array literal")]
    NotAnArray,
}

/// Parse a loose JS literal into a JSON value.
pub fn parse_loose_literal(text: &str) -> Result<Value, LiteralError> {
    let normalized = normalize(text)?;
    Ok(serde_json::from_str(&normalized)?)
}

/// Parse a loose JS array literal into its elements.
pub fn parse_loose_array(text: &str) -> Result<Vec<Value>, LiteralError> {
    match parse_loose_literal(text)? {
        Value::Array(items) => Ok(items),
        _ => Err(LiteralError::NotAnArray),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Next non-whitespace char at or after `from`.
fn peek_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| !c.is_whitespace())
}

/// Rewrite `text` into strict JSON.
pub fn normalize(text: &str) -> Result<String, LiteralError> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                i = copy_string(&chars, i, &mut out)?;
                continue;
            }
            ',' if matches!(peek_significant(&chars, i + 1), Some(']') | Some('}')) => {}
            c if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if peek_significant(&chars, i) == Some(':') {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else if word == "undefined" {
                    out.push_str("null");
                } else {
                    out.push_str(&word);
                }
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    Ok(out)
}

/// Copy the string literal opening at `start` as a JSON string; returns the
/// index just past its closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> Result<usize, LiteralError> {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let escaped = *chars.get(i + 1).ok_or(LiteralError::UnterminatedString)?;
                if escaped == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(escaped);
                }
                i += 2;
                continue;
            }
            c if c == quote => {
                out.push('"');
                return Ok(i + 1);
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        i += 1;
    }

    Err(LiteralError::UnterminatedString)
}
