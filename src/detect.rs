//! PDF file recognition: extension matching for discovery, magic bytes for loading.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Whether a path carries a `.pdf` extension, compared case-insensitively.
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Read the first bytes of a file and verify the `%PDF-x.y` header.
///
/// Returns the version string on success.
pub fn check_pdf_header<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let read = file.read(&mut header)?;
    pdf_version_from_bytes(&header[..read])
}

/// Extract the PDF version from a header byte slice.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    let version_end = PDF_MAGIC.len() + 3;
    if data.len() < version_end || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = String::from_utf8_lossy(&data[PDF_MAGIC.len()..version_end]).to_string();
    let bytes = version.as_bytes();
    if bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit() {
        Ok(version)
    } else {
        Err(Error::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension("report.pdf"));
        assert!(has_pdf_extension("REPORT.PDF"));
        assert!(has_pdf_extension("dir/Mixed.PdF"));
        assert!(!has_pdf_extension("report.pdf.txt"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("notes.md"));
    }

    #[test]
    fn test_version_from_bytes() {
        assert_eq!(pdf_version_from_bytes(b"%PDF-1.7\n%test").unwrap(), "1.7");
        assert_eq!(pdf_version_from_bytes(b"%PDF-2.0\n").unwrap(), "2.0");
    }

    #[test]
    fn test_version_from_bytes_rejects_garbage() {
        assert!(matches!(
            pdf_version_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            pdf_version_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            pdf_version_from_bytes(b"%PDF-x.y"),
            Err(Error::UnknownFormat)
        ));
    }
}
