//! Export orchestration: frame -> rows -> sheet -> XLSX -> file saver.

use polars::prelude::DataFrame;

use crate::error::ExportError;
use crate::frame::{FrameSerializer, PolarsCsvSerializer, derive_dataframe_from_ipc_bytes};
use crate::reader::parse_delimited_text;
use crate::save::{Clock, FileSaver, SystemClock};
use crate::sheet::{build_sheet, build_workbook};
use crate::spec::{SpecExportFile, SpecXlsxExportOptions, SpecXlsxExportReport};
use crate::util::{derive_export_file_name, format_export_timestamp, truncate_title};
use crate::writer::encode_workbook;

/// Synchronous single-table XLSX exporter.
///
/// Each call builds its rows, sheet and workbook from scratch and drops them
/// after the saver returns; nothing is shared between calls.
pub struct XlsxExporter<S, C = SystemClock, F = PolarsCsvSerializer> {
    saver: S,
    clock: C,
    serializer: F,
    options: SpecXlsxExportOptions,
}

impl<S: FileSaver> XlsxExporter<S> {
    /// Exporter using the wall clock and the polars CSV serializer.
    pub fn new(saver: S, options: SpecXlsxExportOptions) -> Self {
        Self::with_collaborators(saver, SystemClock, PolarsCsvSerializer, options)
    }
}

impl<S: FileSaver, C: Clock, F: FrameSerializer> XlsxExporter<S, C, F> {
    pub fn with_collaborators(
        saver: S,
        clock: C,
        serializer: F,
        options: SpecXlsxExportOptions,
    ) -> Self {
        Self {
            saver,
            clock,
            serializer,
            options,
        }
    }

    pub fn options(&self) -> &SpecXlsxExportOptions {
        &self.options
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    pub fn into_saver(self) -> S {
        self.saver
    }

    /// Export `df` as `<title>-<timestamp>.xlsx`.
    ///
    /// Returns `Ok(None)` without touching the saver when the frame has no rows.
    pub fn export_frame(
        &mut self,
        df: &DataFrame,
        title: &str,
    ) -> Result<Option<SpecXlsxExportReport>, ExportError> {
        let c_text = self.serializer.serialize(df, &self.options.csv_config)?;
        self.export_delimited_text(&c_text, title)
    }

    /// Export a frame shipped as Arrow IPC bytes.
    pub fn export_frame_from_ipc_bytes(
        &mut self,
        v_ipc_df: &[u8],
        title: &str,
    ) -> Result<Option<SpecXlsxExportReport>, ExportError> {
        let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
        self.export_frame(&df, title)
    }

    /// Export already-serialized delimited text.
    pub fn export_delimited_text(
        &mut self,
        text: &str,
        title: &str,
    ) -> Result<Option<SpecXlsxExportReport>, ExportError> {
        let row_set = parse_delimited_text(text, &self.options.csv_config)?;
        if row_set.is_empty() {
            tracing::debug!(title, "Nothing to export: zero rows parsed");
            return Ok(None);
        }

        let sheet = build_sheet(&row_set, title);
        let mut report = SpecXlsxExportReport {
            sheet_name: sheet.name.clone(),
            n_rows: sheet.rows.len(),
            n_cols: sheet.header.len(),
            widths: sheet.widths.clone(),
            ..Default::default()
        };

        let workbook = build_workbook(sheet);
        let v_bytes = encode_workbook(&workbook, &self.options.sheet_style)?;

        let c_timestamp =
            format_export_timestamp(self.clock.now(), &self.options.timestamp_config)?;
        let c_file_name = derive_export_file_name(&truncate_title(title), &c_timestamp);
        report.file_name = c_file_name.clone();
        report.n_bytes = v_bytes.len();

        let file = SpecExportFile::new_octet_stream(c_file_name, v_bytes);
        self.saver.save(&file)?;
        tracing::info!(
            file_name = %report.file_name,
            n_rows = report.n_rows,
            n_cols = report.n_cols,
            n_bytes = report.n_bytes,
            "Exported table"
        );

        Ok(Some(report))
    }
}
