//! Normalization of CSV or JSON tabular payloads into rectangular rows.
//!
//! Model output is untrusted: the payload may be a JSON array of flat
//! objects, a CSV body with `;` or `,` delimiters, or something in between.
//! JSON parsing is attempted first for `[`-prefixed input and falls through
//! to CSV silently on failure — the caller never sees a parse error from
//! this module.

use crate::package::normalize_newlines;
use serde_json::Value;
use tracing::debug;

/// Parse tabular data into an ordered list of rows.
///
/// JSON-array-of-objects input synthesizes a header row from the first-seen
/// order union of all keys; the CSV path never synthesizes one, so a CSV
/// payload that wants a header must carry it as its first line.
pub fn parse_table_data(input: &str) -> Vec<Vec<String>> {
    let trimmed = input.trim();

    if trimmed.starts_with('[') {
        if let Some(rows) = parse_json_rows(trimmed) {
            return rows;
        }
        debug!("tabular payload is not a JSON array of objects, treating as CSV");
    }

    parse_csv_rows(trimmed)
}

/// JSON-array-of-objects path. Returns `None` on any shape mismatch so the
/// caller can fall through to CSV.
fn parse_json_rows(input: &str) -> Option<Vec<Vec<String>>> {
    let value: Value = serde_json::from_str(input).ok()?;
    let items = value.as_array()?;

    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        objects.push(item.as_object()?);
    }

    // Header: union of keys across all objects, first-seen order.
    let mut header: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(objects.len() + 1);
    rows.push(header.clone());

    for obj in &objects {
        let row = header
            .iter()
            .map(|key| match obj.get(key) {
                None => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        rows.push(row);
    }

    Some(rows)
}

/// CSV path: delimiter is `;` when the text contains any, `,` otherwise.
/// Blank lines are skipped and every field is trimmed.
fn parse_csv_rows(input: &str) -> Vec<Vec<String>> {
    let text = normalize_newlines(input);
    let delimiter = if text.contains(';') { ';' } else { ',' };

    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(delimiter)
                .map(|field| field.trim().to_string())
                .collect()
        })
        .collect()
}
