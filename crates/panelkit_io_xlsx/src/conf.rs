//! Export constants and default preset factories.

use crate::spec::{SpecCsvConfig, SpecXlsxExportOptions};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Number of title characters kept when a title overflows the sheet name limit.
pub const N_LEN_SHEET_NAME_TRUNCATED: usize = 28;
/// Marker appended to truncated titles.
pub const C_SHEET_NAME_ELLIPSIS: &str = "...";
/// Fallback sheet name when a title sanitizes to nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Padding added to every inferred column width.
pub const N_WIDTH_CELL_PADDING: usize = 1;
/// Excel column width maximum, in characters.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;

/// Excel cell text maximum length, in characters.
pub const N_LEN_EXCEL_CELL_TEXT_MAX: usize = 32_767;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;

/// MIME type handed to file savers.
pub const C_MIME_OCTET_STREAM: &str = "application/octet-stream";
/// Extension of generated files (without dot).
pub const C_FILE_EXTENSION_XLSX: &str = "xlsx";
/// Characters not allowed in file names on common filesystems.
pub const TUP_FILE_NAME_ILLEGAL: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Display format used for file-name timestamps and datetime cells.
pub const C_DATETIME_FORMAT_DEFAULT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of a "looks numeric" raw value: digits/whitespace with at most one dot.
pub const C_PATTERN_NUMERIC_SHAPE: &str = r"^[0-9\s]*\.?[0-9\s]*$";

/// Prefix of the Excel delimiter hint line (`sep=,`).
pub const C_EXCEL_SEPARATOR_HINT: &str = "sep=";

/// Build default delimited-text config.
pub fn derive_default_csv_config() -> SpecCsvConfig {
    SpecCsvConfig::default()
}

/// Build default export options.
pub fn derive_default_xlsx_export_options() -> SpecXlsxExportOptions {
    SpecXlsxExportOptions::default()
}
