//! JSON rendering for document records.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::DocumentRecord;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a record to JSON. Non-ASCII text is written as-is.
pub fn to_json(record: &DocumentRecord, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(record),
        JsonFormat::Compact => serde_json::to_string(record),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write a record to a UTF-8 JSON file.
pub fn write_json(path: &Path, record: &DocumentRecord, format: JsonFormat) -> Result<()> {
    let json = to_json(record, format)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    fn sample() -> DocumentRecord {
        DocumentRecord::new(
            "Überblick",
            vec![OutlineEntry::new(HeadingLevel::H1, "Einleitung", 2)],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Überblick\""));
        assert!(json.contains("\n  \"outline\""));
        assert!(json.contains("\"level\": \"H1\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&DocumentRecord::empty(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        write_json(&path, &sample(), JsonFormat::Compact).unwrap();
        let back: DocumentRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
    }
}
