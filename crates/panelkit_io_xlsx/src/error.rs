//! Export error type.

use thiserror::Error;

/// Errors raised by export collaborators.
///
/// Empty input, non-numeric shapes and oversized titles are not errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Frame could not be serialized to delimited text.
    #[error("failed to serialize frame to delimited text: {0}")]
    CsvSerialize(#[from] polars::prelude::PolarsError),

    /// Delimited text could not be parsed.
    #[error("failed to parse delimited text: {0}")]
    CsvParse(#[from] csv::Error),

    /// Frame bytes could not be decoded.
    #[error("failed to decode frame: {message}")]
    FrameDecode { message: String },

    /// Workbook encoding failed.
    #[error("xlsx write error: {0}")]
    XlsxEncode(#[from] rust_xlsxwriter::XlsxError),

    /// Row/column index does not fit the worksheet grid.
    #[error("{axis} index overflow: {value}")]
    IndexOverflow { axis: &'static str, value: usize },

    /// File-save collaborator failed.
    #[error("failed to save {file_name}: {message}")]
    FileSave { file_name: String, message: String },

    /// Invalid option value supplied by a caller.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
