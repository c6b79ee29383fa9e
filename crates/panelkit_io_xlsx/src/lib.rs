//! `panelkit_io_xlsx` v1:
//! Rust-side panel table export kernel (frame -> delimited text -> XLSX).
//!
//! Pipeline stages map onto modules:
//! - `frame`      : frame serializer (DataFrame -> delimited text)
//! - `reader`     : row parser (delimited text -> rows)
//! - `util`       : cell classifier, layout engine, title/file naming helpers
//! - `sheet`      : sheet/workbook builder
//! - `writer`     : XLSX encoder
//! - `export`     : orchestration and emitter
//!
//! Supporting modules:
//! - `conf`       : constants and default presets
//! - `spec`       : data model and options
//! - `error`      : error type
//! - `save`       : file-save collaborators and clocks
//! - `affordance` : panel action visibility policy
pub mod affordance;
pub mod conf;
pub mod error;
pub mod export;
pub mod frame;
pub mod reader;
pub mod save;
pub mod sheet;
pub mod spec;
pub mod util;
pub mod writer;

pub use affordance::{EnumPanelAction, SpecPanelAffordance, derive_panel_affordance};
pub use conf::{
    C_FILE_EXTENSION_XLSX, C_MIME_OCTET_STREAM, C_SHEET_NAME_ELLIPSIS, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_LEN_SHEET_NAME_TRUNCATED, N_WIDTH_CELL_PADDING,
};
pub use error::ExportError;
pub use export::XlsxExporter;
pub use frame::{
    FrameSerializer, PolarsCsvSerializer, derive_dataframe_from_ipc_bytes, serialize_frame_to_csv,
};
pub use reader::parse_delimited_text;
pub use save::{Clock, DirFileSaver, FileSaver, FixedClock, MemoryFileSaver, SystemClock};
pub use sheet::{build_sheet, build_workbook};
pub use spec::{
    EnumCellValue, EnumTimezone, SpecCsvConfig, SpecExportFile, SpecRowSet, SpecSheet,
    SpecSheetStyle, SpecTimestampConfig, SpecWorkbook, SpecXlsxExportOptions,
    SpecXlsxExportReport,
};
pub use util::{
    calculate_column_widths, classify_cell_value, derive_export_file_name, parse_single_ascii_byte,
    parse_timezone, sanitize_sheet_name, truncate_title,
};
pub use writer::encode_workbook;
