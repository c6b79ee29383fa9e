//! Frame serializer: polars `DataFrame` -> delimited text.

use std::io::Cursor;

use polars::prelude::{CsvWriter, DataFrame, IpcReader, SerReader, SerWriter};

use crate::conf::C_EXCEL_SEPARATOR_HINT;
use crate::error::ExportError;
use crate::spec::SpecCsvConfig;

/// Converts a typed frame into delimited text.
pub trait FrameSerializer {
    fn serialize(
        &self,
        df: &DataFrame,
        csv_config: &SpecCsvConfig,
    ) -> Result<String, ExportError>;
}

/// Default serializer backed by polars' CSV writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarsCsvSerializer;

impl FrameSerializer for PolarsCsvSerializer {
    fn serialize(
        &self,
        df: &DataFrame,
        csv_config: &SpecCsvConfig,
    ) -> Result<String, ExportError> {
        serialize_frame_to_csv(df, csv_config)
    }
}

/// Serialize `df` using `csv_config` (header, delimiter, quoting, nulls, datetimes).
pub fn serialize_frame_to_csv(
    df: &DataFrame,
    csv_config: &SpecCsvConfig,
) -> Result<String, ExportError> {
    let mut v_buf: Vec<u8> = Vec::new();
    if csv_config.if_use_excel_header {
        v_buf.extend_from_slice(C_EXCEL_SEPARATOR_HINT.as_bytes());
        v_buf.push(csv_config.delimiter);
        v_buf.extend_from_slice(csv_config.line_terminator.as_bytes());
    }

    // `finish` needs `&mut DataFrame`.
    let mut df_out = df.clone();
    CsvWriter::new(&mut v_buf)
        .include_header(csv_config.if_include_header)
        .with_separator(csv_config.delimiter)
        .with_quote_char(csv_config.quote_char)
        .with_line_terminator(csv_config.line_terminator.clone())
        .with_null_value(derive_null_token(df, csv_config))
        .with_datetime_format(Some(csv_config.datetime_format.clone()))
        .finish(&mut df_out)?;

    tracing::debug!(
        n_rows = df.height(),
        n_cols = df.width(),
        n_bytes = v_buf.len(),
        "Serialized frame to delimited text"
    );

    String::from_utf8(v_buf).map_err(|err| ExportError::FrameDecode {
        message: format!("serialized frame is not valid UTF-8: {err}"),
    })
}

/// Text written for null cells.
///
/// A blank record is skipped by the row parser, so a one-column frame writes
/// nulls as an empty quoted field instead of an empty line.
fn derive_null_token(df: &DataFrame, csv_config: &SpecCsvConfig) -> String {
    if df.width() == 1 && csv_config.null_value.is_empty() {
        let c_quote = char::from(csv_config.quote_char);
        return format!("{c_quote}{c_quote}");
    }
    csv_config.null_value.clone()
}

/// Decode an Arrow IPC payload into a frame.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame, ExportError> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| ExportError::FrameDecode {
            message: format!("failed to read IPC DataFrame bytes: {err}"),
        })
}
