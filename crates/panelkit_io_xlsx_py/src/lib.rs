use std::sync::Arc;

use arrow::array::{StructArray, TryExtend};
use arrow::datatypes::{ArrowDataType, ArrowSchema, Field as ArrowField};
use arrow::record_batch::RecordBatchT;
use panelkit_io_xlsx::conf::derive_default_csv_config;
use panelkit_io_xlsx::spec::{
    SpecCsvConfig, SpecExportFile, SpecSheetStyle, SpecTimestampConfig,
    SpecXlsxExportOptions, SpecXlsxExportReport,
};
use panelkit_io_xlsx::{
    DirFileSaver, ExportError, FileSaver, MemoryFileSaver, XlsxExporter, parse_single_ascii_byte,
    parse_timezone,
};
use polars::prelude::DataFrame;
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::ffi as pyffi;
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "panelkit.xlsx.export.v1";
const C_BRIDGE_TRANSPORT: &str = "arrow_c_data";
const C_ARROW_ARRAY_STREAM_CAPSULE_NAME: &[u8] = b"arrow_array_stream\0";

////////////////////////////////////////////////////////////////////////////////
// #region Report

#[pyclass(name = "ExportReport", frozen)]
struct PyExportReport {
    #[pyo3(get)]
    file_name: String,
    #[pyo3(get)]
    sheet_name: String,
    #[pyo3(get)]
    n_rows: usize,
    #[pyo3(get)]
    n_cols: usize,
    #[pyo3(get)]
    widths: Vec<usize>,
    #[pyo3(get)]
    n_bytes: usize,
    v_content: Option<Vec<u8>>,
}

#[pymethods]
impl PyExportReport {
    /// Workbook bytes when no `save_as`/`dir_out` target was given.
    #[getter]
    fn content<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyBytes>> {
        self.v_content
            .as_deref()
            .map(|v_bytes| PyBytes::new(py, v_bytes))
    }

    fn __repr__(&self) -> String {
        format!(
            "ExportReport(file_name={:?}, sheet_name={:?}, n_rows={}, n_cols={}, n_bytes={})",
            self.file_name, self.sheet_name, self.n_rows, self.n_cols, self.n_bytes
        )
    }
}

impl PyExportReport {
    fn from_report(report: SpecXlsxExportReport, v_content: Option<Vec<u8>>) -> Self {
        Self {
            file_name: report.file_name,
            sheet_name: report.sheet_name,
            n_rows: report.n_rows,
            n_cols: report.n_cols,
            widths: report.widths,
            n_bytes: report.n_bytes,
            v_content,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Savers

/// Hands each download to a Python `save_as(content, file_name, mime_type)`.
struct PyCallableSaver {
    callable: Py<PyAny>,
}

impl FileSaver for PyCallableSaver {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError> {
        Python::with_gil(|py| {
            let bytes_content = PyBytes::new(py, &file.content);
            self.callable
                .call1(
                    py,
                    (
                        bytes_content,
                        file.file_name.as_str(),
                        file.mime_type.as_str(),
                    ),
                )
                .map(|_| ())
        })
        .map_err(|err| ExportError::FileSave {
            file_name: file.file_name.clone(),
            message: err.to_string(),
        })
    }
}

enum EnumHostSaver {
    Callable(PyCallableSaver),
    Dir(DirFileSaver),
    Memory(MemoryFileSaver),
}

impl FileSaver for EnumHostSaver {
    fn save(&mut self, file: &SpecExportFile) -> Result<(), ExportError> {
        match self {
            Self::Callable(saver) => saver.save(file),
            Self::Dir(saver) => saver.save(file),
            Self::Memory(saver) => saver.save(file),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Export

#[pyfunction(name = "export_xlsx")]
#[pyo3(signature = (
    df,
    title,
    save_as = None,
    dir_out = None,
    delimiter = ",",
    quote_char = "\"",
    if_include_header = true,
    if_use_excel_header = false,
    timestamp_format = None,
    timezone = "local",
    if_bold_header = false,
    if_freeze_header = false
))]
#[allow(clippy::too_many_arguments)]
fn export_xlsx_py(
    py: Python<'_>,
    df: &Bound<'_, PyAny>,
    title: &str,
    save_as: Option<&Bound<'_, PyAny>>,
    dir_out: Option<String>,
    delimiter: &str,
    quote_char: &str,
    if_include_header: bool,
    if_use_excel_header: bool,
    timestamp_format: Option<String>,
    timezone: &str,
    if_bold_header: bool,
    if_freeze_header: bool,
) -> PyResult<Option<PyExportReport>> {
    let cfg_csv = SpecCsvConfig {
        delimiter: parse_single_ascii_byte(delimiter, "delimiter").map_err(map_export_error)?,
        quote_char: parse_single_ascii_byte(quote_char, "quote_char").map_err(map_export_error)?,
        if_include_header,
        if_use_excel_header,
        ..derive_default_csv_config()
    };
    let cfg_timestamp = SpecTimestampConfig {
        format: timestamp_format.unwrap_or_else(|| SpecTimestampConfig::default().format),
        timezone: parse_timezone(timezone).map_err(map_export_error)?,
    };
    let cfg_options = SpecXlsxExportOptions {
        csv_config: cfg_csv,
        timestamp_config: cfg_timestamp,
        sheet_style: SpecSheetStyle {
            if_bold_header,
            if_freeze_header,
        },
    };

    let saver = match (save_as, dir_out) {
        (Some(callable), _) if !callable.is_none() => {
            if !callable.is_callable() {
                return Err(PyValueError::new_err("save_as must be callable."));
            }
            EnumHostSaver::Callable(PyCallableSaver {
                callable: callable.clone().unbind(),
            })
        }
        (_, Some(dir_out)) => EnumHostSaver::Dir(DirFileSaver::new(dir_out)),
        _ => EnumHostSaver::Memory(MemoryFileSaver::new()),
    };

    let df_data = derive_dataframe_from_any_dataframe(py, df)?;
    let mut exporter = XlsxExporter::new(saver, cfg_options);
    let Some(report) = exporter
        .export_frame(&df_data, title)
        .map_err(map_export_error)?
    else {
        return Ok(None);
    };

    let v_content = match exporter.into_saver() {
        EnumHostSaver::Memory(saver) => saver
            .into_files()
            .pop()
            .map(|file| file.content),
        _ => None,
    };
    Ok(Some(PyExportReport::from_report(report, v_content)))
}

fn map_export_error(exception: ExportError) -> PyErr {
    match exception {
        ExportError::InvalidConfig(message) => PyValueError::new_err(message),
        ExportError::FileSave { .. } => PyOSError::new_err(exception.to_string()),
        _ => PyRuntimeError::new_err(exception.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FrameImport

fn derive_dataframe_from_any_dataframe(
    py: Python<'_>,
    df: &Bound<'_, PyAny>,
) -> PyResult<DataFrame> {
    let module_polars = py.import("polars")?;
    let cls_dataframe = module_polars.getattr("DataFrame")?;
    let df_polars = if df.is_instance(&cls_dataframe)? {
        df.clone()
    } else {
        cls_dataframe.call1((df,))?
    };

    let obj_capsule = df_polars.call_method0("__arrow_c_stream__")?;
    derive_dataframe_from_arrow_c_stream_capsule(&obj_capsule)
}

fn derive_dataframe_from_arrow_c_stream_capsule(
    obj_capsule: &Bound<'_, PyAny>,
) -> PyResult<DataFrame> {
    let ptr_capsule = obj_capsule.as_ptr();
    let ptr_name = C_ARROW_ARRAY_STREAM_CAPSULE_NAME
        .as_ptr()
        .cast::<std::os::raw::c_char>();

    // Safety: both pointers stay alive for the duration of the check.
    if unsafe { pyffi::PyCapsule_IsValid(ptr_capsule, ptr_name) } == 0 {
        return Err(PyValueError::new_err(
            "__arrow_c_stream__ did not return an `arrow_array_stream` capsule.",
        ));
    }

    // Safety: capsule name validated above.
    let ptr_stream = unsafe { pyffi::PyCapsule_GetPointer(ptr_capsule, ptr_name) };
    if ptr_stream.is_null() {
        return Err(PyValueError::new_err("Arrow stream capsule is empty."));
    }

    let stream = ptr_stream.cast::<arrow::ffi::ArrowArrayStream>();
    // Safety: the capsule owns a live ArrowArrayStream until `obj_capsule` is dropped.
    let mut reader = unsafe { arrow::ffi::ArrowArrayStreamReader::try_new(&mut *stream) }
        .map_err(|err| PyValueError::new_err(format!("Cannot open Arrow stream: {err}")))?;

    let schema_arrow = derive_arrow_schema_from_stream_field(reader.field())?;
    let schema_ref = Arc::new(schema_arrow.clone());
    let mut df = DataFrame::empty_with_arrow_schema(&schema_arrow);

    // Safety: `reader` is driven on the thread holding the GIL that owns the capsule.
    while let Some(res_batch) = unsafe { reader.next() } {
        let array_batch = res_batch
            .map_err(|err| PyValueError::new_err(format!("Cannot read Arrow batch: {err}")))?;
        let array_struct = array_batch
            .as_any()
            .downcast_ref::<StructArray>()
            .ok_or_else(|| PyValueError::new_err("Arrow batches must be StructArray."))?;

        let record_batch = RecordBatchT::try_new(
            array_struct.len(),
            schema_ref.clone(),
            array_struct.values().to_vec(),
        )
        .map_err(|err| PyValueError::new_err(format!("Invalid Arrow batch: {err}")))?;
        df.try_extend(std::iter::once(record_batch))
            .map_err(|err| PyValueError::new_err(format!("Cannot append Arrow batch: {err}")))?;
    }

    Ok(df)
}

fn derive_arrow_schema_from_stream_field(field: &ArrowField) -> PyResult<ArrowSchema> {
    let ArrowDataType::Struct(l_fields) = field.dtype() else {
        return Err(PyValueError::new_err(format!(
            "Arrow stream must carry a Struct schema, got: {:?}",
            field.dtype()
        )));
    };
    Ok(l_fields
        .iter()
        .map(|field_inner| (field_inner.name.clone(), field_inner.clone()))
        .collect::<ArrowSchema>())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[pymodule]
fn _panelkit_io_xlsx_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyExportReport>()?;
    module.add_function(wrap_pyfunction!(export_xlsx_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
