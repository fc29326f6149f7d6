//! Token substitution for the seal fragment.
//!
//! A fragment is a piece of TikZ drawn around the origin. Tokens are
//! upper-case names between `@` signs; anything else (including TeX's own
//! `\@` macros) passes through untouched.

use crate::error::{LabelError, Result};
use crate::record::Record;

pub const BUILTIN_FRAGMENT: &str = include_str!("../assets/seal.tex");

/// Values for the non-field tokens.
pub struct SealValues<'a> {
    pub qr_path: &'a str,
    pub qr_size: &'a str,
    pub text_size: &'a str,
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn lookup(token: &str, record: &Record, values: &SealValues<'_>) -> Result<Option<String>> {
    let v = match token {
        "TEXT" => record.text().to_string(),
        "QR" => values.qr_path.to_string(),
        "QRSIZE" => values.qr_size.to_string(),
        "SIZE" => values.text_size.to_string(),
        _ => {
            let Some(index) = token.strip_prefix("FIELD").and_then(|n| n.parse::<usize>().ok())
            else {
                return Ok(None);
            };
            match record.fields.get(index) {
                Some(f) => f.clone(),
                None => {
                    return Err(LabelError::SealField {
                        line: record.line,
                        index,
                        found: record.fields.len(),
                    });
                }
            }
        }
    };
    Ok(Some(v))
}

pub fn fill(fragment: &str, record: &Record, values: &SealValues<'_>) -> Result<String> {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(start) = rest.find('@') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        if let Some(end) = after.find('@')
            && is_token(&after[..end])
            && let Some(v) = lookup(&after[..end], record, values)?
        {
            out.push_str(&v);
            rest = &after[end + 1..];
            continue;
        }
        out.push('@');
        rest = after;
    }
    out.push_str(rest);
    Ok(out)
}
