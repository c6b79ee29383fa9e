//! Shared export data models and options.

use crate::conf::{C_DATETIME_FORMAT_DEFAULT, C_MIME_OCTET_STREAM};

////////////////////////////////////////////////////////////////////////////////
// #region DelimitedTextSpecification

/// Delimited-text settings shared by the frame serializer and the row parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvConfig {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte.
    pub quote_char: u8,
    /// Record terminator written by the serializer.
    pub line_terminator: String,
    /// Write/read a header record.
    pub if_include_header: bool,
    /// Prefix output with an Excel `sep=<delimiter>` hint line.
    pub if_use_excel_header: bool,
    /// Text written for null cells.
    pub null_value: String,
    /// `strftime`-style format for datetime columns.
    pub datetime_format: String,
}

impl Default for SpecCsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
            line_terminator: "\r\n".to_string(),
            if_include_header: true,
            if_use_excel_header: false,
            null_value: String::new(),
            datetime_format: C_DATETIME_FORMAT_DEFAULT.to_string(),
        }
    }
}

/// Parsed delimited text: header fields plus header-width rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecRowSet {
    /// Field names in header order.
    pub fields: Vec<String>,
    /// Raw values; `None` marks a value missing from its record.
    pub rows: Vec<Vec<Option<String>>>,
}

impl SpecRowSet {
    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of fields.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(field, raw value)` pairs of one row in header order.
    pub fn iter_row(&self, row_idx: usize) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.fields
            .iter()
            .zip(self.rows.get(row_idx).into_iter().flatten())
            .map(|(c_field, c_value)| (c_field.as_str(), c_value.as_deref()))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Classified cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    Empty,
    /// Numeric value.
    Numeric(f64),
    /// Text value.
    Text(String),
}

impl EnumCellValue {
    /// Display text used for width inference; blank for `Empty`.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Numeric(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One named table ready for encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheet {
    /// Sheet display name (<= 31 chars).
    pub name: String,
    /// Header field names.
    pub header: Vec<String>,
    /// Classified body rows.
    pub rows: Vec<Vec<EnumCellValue>>,
    /// Column widths, parallel to `header`.
    pub widths: Vec<usize>,
}

/// Workbook container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecWorkbook {
    pub sheets: Vec<SpecSheet>,
}

/// Visual options applied by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecSheetStyle {
    /// Bold header row.
    pub if_bold_header: bool,
    /// Freeze panes below the header row.
    pub if_freeze_header: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EmitSpecification

/// Timezone used to render the file-name timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumTimezone {
    /// Host local timezone.
    #[default]
    Local,
    /// UTC.
    Utc,
    /// Fixed offset east of UTC, in seconds.
    FixedOffset(i32),
}

/// File-name timestamp rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTimestampConfig {
    /// `strftime`-style display format.
    pub format: String,
    /// Target timezone.
    pub timezone: EnumTimezone,
}

impl Default for SpecTimestampConfig {
    fn default() -> Self {
        Self {
            format: C_DATETIME_FORMAT_DEFAULT.to_string(),
            timezone: EnumTimezone::Local,
        }
    }
}

/// File handed to a [`crate::save::FileSaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportFile {
    /// Generated file name (`<title>-<timestamp>.xlsx`).
    pub file_name: String,
    /// MIME type of `content`.
    pub mime_type: String,
    /// Encoded workbook bytes.
    pub content: Vec<u8>,
}

impl SpecExportFile {
    /// Wrap workbook bytes as a generic binary download.
    pub fn new_octet_stream(file_name: String, content: Vec<u8>) -> Self {
        Self {
            file_name,
            mime_type: C_MIME_OCTET_STREAM.to_string(),
            content,
        }
    }
}

/// Exporter-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxExportOptions {
    /// Frame serialization / row parsing settings.
    pub csv_config: SpecCsvConfig,
    /// File-name timestamp rendering.
    pub timestamp_config: SpecTimestampConfig,
    /// Encoder visual options.
    pub sheet_style: SpecSheetStyle,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-export summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxExportReport {
    /// File name handed to the saver.
    pub file_name: String,
    /// Sheet name written into the workbook.
    pub sheet_name: String,
    /// Number of data rows.
    pub n_rows: usize,
    /// Number of columns.
    pub n_cols: usize,
    /// Column widths in header order.
    pub widths: Vec<usize>,
    /// Encoded size in bytes.
    pub n_bytes: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
