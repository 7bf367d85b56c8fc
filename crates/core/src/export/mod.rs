pub mod csv;
pub mod filename;

pub use csv::{to_csv, CsvError};
pub use filename::export_filename;
