//! Output schema validation.
//!
//! Coerces an arbitrary JSON value into a well-formed record:
//!
//! ```text
//! {"title": string, "outline": [{"level": "H1"|"H2"|"H3", "text": string, "page": integer}]}
//! ```
//!
//! Anything that cannot be coerced is dropped; a value that is not an object
//! at all becomes the empty record.

use serde_json::{Map, Value};

use crate::model::{DocumentRecord, HeadingLevel, OutlineEntry};

/// Page number used when an entry's page is not numeric.
const DEFAULT_PAGE: u32 = 1;

/// Validate and clean a JSON value.
pub fn validate_value(value: &Value) -> DocumentRecord {
    let Value::Object(map) = value else {
        log::warn!("Record is not a JSON object, replacing with empty schema");
        return DocumentRecord::empty();
    };

    let title = map.get("title").map(coerce_title).unwrap_or_default();

    let outline = match map.get("outline") {
        Some(Value::Array(items)) => items.iter().filter_map(validate_item).collect(),
        _ => Vec::new(),
    };

    DocumentRecord::new(title.trim(), outline)
}

/// Round-trip a record through the validator.
pub fn validate_record(record: &DocumentRecord) -> DocumentRecord {
    match serde_json::to_value(record) {
        Ok(value) => validate_value(&value),
        Err(e) => {
            log::warn!("Could not serialize record for validation: {}", e);
            DocumentRecord::empty()
        }
    }
}

fn validate_item(item: &Value) -> Option<OutlineEntry> {
    let Value::Object(fields) = item else {
        return None;
    };
    let (level, text, page) = required_fields(fields)?;

    let level = HeadingLevel::from_label(&stringify(level))?;
    let text = stringify(text).trim().to_string();
    if text.is_empty() {
        return None;
    }

    Some(OutlineEntry::new(level, text, coerce_page(page)))
}

fn required_fields(fields: &Map<String, Value>) -> Option<(&Value, &Value, &Value)> {
    Some((fields.get("level")?, fields.get("text")?, fields.get("page")?))
}

/// Strings pass through; other values are rendered as JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Falsy values become empty, other non-strings their JSON text.
fn coerce_title(value: &Value) -> String {
    if is_falsy(value) {
        String::new()
    } else {
        stringify(value)
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Numbers are truncated toward zero; anything else, or an out-of-range
/// number, becomes the default page.
fn coerce_page(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    number
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_PAGE)
}
