//! Rendering and validation of output records.

mod json;
pub mod validate;

pub use json::{to_json, write_json, JsonFormat};
pub use validate::{validate_record, validate_value};
