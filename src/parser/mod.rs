//! Native PDF text layout extraction.

mod backend;
mod layout;

pub use backend::{LayoutSource, LopdfLayout};
pub use layout::{group_lines_into_blocks, group_spans_into_lines, LayoutAnalyzer, TextLine, TextSpan};
