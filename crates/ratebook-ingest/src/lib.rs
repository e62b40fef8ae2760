pub mod csv;
pub mod error;
pub mod schema_file;

pub use crate::csv::{read_table, write_table};
pub use error::IngestError;
pub use schema_file::load_schema;
