//! Document model types.
//!
//! Layout types carry positioned text produced by the layout and OCR
//! collaborators; record types are the per-document output.

mod layout;
mod record;

pub use layout::{FontSizeKey, LayoutBlock, LayoutChar, LayoutPage, PositionedSpan};
pub use record::{dedupe_outline, DocumentRecord, HeadingLevel, OutlineEntry};
