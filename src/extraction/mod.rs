//! Fixed-offset extraction of per-plant production data.
//!
//! The source sheets have no header row. Each plant ("usina") occupies a
//! 4-column block at a fixed stride, and the hourly data always sits in the
//! same 24-row window. `schema` encodes that physical layout; `extractor`
//! turns a sheet snapshot into an `ExtractionResult`.

pub mod errors;
pub mod extractor;
pub mod schema;
pub mod types;

pub use errors::ExtractionError;
pub use extractor::{extract, extract_json, extract_to_json};
pub use schema::{EntitySchema, ENTITY_SCHEMAS, ROW_WINDOW};
pub use types::{ExtractionRecord, ExtractionResult};
