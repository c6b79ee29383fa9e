//! XLSX encoder that turns a built workbook into container bytes.

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::conf::{N_LEN_EXCEL_CELL_TEXT_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::error::ExportError;
use crate::spec::{EnumCellValue, SpecSheet, SpecSheetStyle, SpecWorkbook};

/// Encode `workbook` as XLSX bytes.
///
/// Header cells are strings, `Numeric` cells numbers, `Text` cells strings and
/// `Empty` cells are left unwritten. Column widths come from the sheet. Text
/// longer than the Excel cell limit is cut to that limit.
pub fn encode_workbook(
    workbook: &SpecWorkbook,
    sheet_style: &SpecSheetStyle,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook_xlsx = Workbook::new();
    let fmt_header = derive_header_format(sheet_style);

    for sheet in &workbook.sheets {
        let worksheet = workbook_xlsx.add_worksheet();
        write_sheet(worksheet, sheet, fmt_header.as_ref(), sheet_style)?;
    }

    let v_bytes = workbook_xlsx.save_to_buffer()?;
    tracing::debug!(
        n_sheets = workbook.sheets.len(),
        n_bytes = v_bytes.len(),
        "Encoded workbook"
    );
    Ok(v_bytes)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SpecSheet,
    fmt_header: Option<&Format>,
    sheet_style: &SpecSheetStyle,
) -> Result<(), ExportError> {
    cast_row_num(sheet.rows.len())?;
    worksheet.set_name(&sheet.name)?;

    for (n_idx_col, c_field) in sheet.header.iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        match fmt_header {
            Some(fmt) => worksheet.write_string_with_format(0, n_col, c_field, fmt)?,
            None => worksheet.write_string(0, n_col, c_field)?,
        };
    }

    let mut n_cells_truncated = 0usize;
    for (n_idx_row, row) in sheet.rows.iter().enumerate() {
        let n_row = cast_row_num(n_idx_row + 1)?;
        for (n_idx_col, value) in row.iter().enumerate() {
            if write_cell(worksheet, n_row, cast_col_num(n_idx_col)?, value)? {
                n_cells_truncated += 1;
            }
        }
    }
    if n_cells_truncated > 0 {
        tracing::warn!(
            sheet_name = %sheet.name,
            n_cells_truncated,
            n_len_max = N_LEN_EXCEL_CELL_TEXT_MAX,
            "Cut text cells to the Excel cell limit"
        );
    }

    for (n_idx_col, n_width) in sheet.widths.iter().enumerate() {
        worksheet.set_column_width(cast_col_num(n_idx_col)?, *n_width as f64)?;
    }

    if sheet_style.if_freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    Ok(())
}

/// Write one body cell; returns whether its text was cut.
fn write_cell(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellValue,
) -> Result<bool, ExportError> {
    match value {
        EnumCellValue::Empty => Ok(false),
        EnumCellValue::Numeric(val) => {
            worksheet.write_number(n_row, n_col, *val)?;
            Ok(false)
        }
        EnumCellValue::Text(val) => match truncate_cell_text(val) {
            Some(c_truncated) => {
                worksheet.write_string(n_row, n_col, &c_truncated)?;
                Ok(true)
            }
            None => {
                worksheet.write_string(n_row, n_col, val)?;
                Ok(false)
            }
        },
    }
}

/// First `N_LEN_EXCEL_CELL_TEXT_MAX` chars of `value`, or `None` if it fits.
fn truncate_cell_text(value: &str) -> Option<String> {
    let (n_idx_cut, _) = value.char_indices().nth(N_LEN_EXCEL_CELL_TEXT_MAX)?;
    Some(value[..n_idx_cut].to_string())
}

fn derive_header_format(sheet_style: &SpecSheetStyle) -> Option<Format> {
    sheet_style
        .if_bold_header
        .then(|| Format::new().set_bold())
}

/// Row index to worksheet row; `value` counts the header row.
fn cast_row_num(value: usize) -> Result<u32, ExportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ExportError::IndexOverflow { axis: "row", value });
    }
    u32::try_from(value).map_err(|_| ExportError::IndexOverflow { axis: "row", value })
}

fn cast_col_num(value: usize) -> Result<u16, ExportError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ExportError::IndexOverflow {
            axis: "column",
            value,
        });
    }
    u16::try_from(value).map_err(|_| ExportError::IndexOverflow {
        axis: "column",
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;

    const V_ZIP_MAGIC: &[u8] = b"PK\x03\x04";
    const C_PART_SHEET: &str = "xl/worksheets/sheet1.xml";
    const C_PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

    fn create_sheet(name: &str) -> SpecSheet {
        SpecSheet {
            name: name.to_string(),
            header: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![
                    EnumCellValue::Numeric(1.0),
                    EnumCellValue::Text("Alice".to_string()),
                ],
                vec![EnumCellValue::Numeric(22.0), EnumCellValue::Empty],
            ],
            widths: vec![3, 6],
        }
    }

    fn encode_single_sheet(sheet: SpecSheet, sheet_style: &SpecSheetStyle) -> Vec<u8> {
        let workbook = SpecWorkbook {
            sheets: vec![sheet],
        };
        encode_workbook(&workbook, sheet_style).unwrap()
    }

    fn read_zip_part(v_bytes: &[u8], c_name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(v_bytes)).unwrap();
        let mut c_xml = String::new();
        archive
            .by_name(c_name)
            .unwrap()
            .read_to_string(&mut c_xml)
            .unwrap();
        c_xml
    }

    #[test]
    fn test_encode_workbook_writes_typed_cells() {
        let v_bytes = encode_single_sheet(create_sheet("People"), &SpecSheetStyle::default());
        assert!(v_bytes.starts_with(V_ZIP_MAGIC));

        let c_sheet = read_zip_part(&v_bytes, C_PART_SHEET);
        // Header strings in row 1, shared-string indices in write order.
        assert!(c_sheet.contains(r#"<c r="A1" t="s"><v>0</v></c>"#));
        assert!(c_sheet.contains(r#"<c r="B1" t="s"><v>1</v></c>"#));
        // Numerics as numbers, text as shared strings.
        assert!(c_sheet.contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(c_sheet.contains(r#"<c r="B2" t="s"><v>2</v></c>"#));
        assert!(c_sheet.contains(r#"<c r="A3"><v>22</v></c>"#));
        // Empty cells are not written.
        assert!(!c_sheet.contains(r#"r="B3""#));

        let c_strings = read_zip_part(&v_bytes, C_PART_SHARED_STRINGS);
        for c_text in ["<t>id</t>", "<t>name</t>", "<t>Alice</t>"] {
            assert!(c_strings.contains(c_text), "{c_text}");
        }
        assert!(!c_strings.contains("<t>22</t>"));

        let c_workbook = read_zip_part(&v_bytes, "xl/workbook.xml");
        assert!(c_workbook.contains(r#"<sheet name="People""#));
    }

    #[test]
    fn test_encode_workbook_applies_column_widths() {
        let v_bytes = encode_single_sheet(create_sheet("People"), &SpecSheetStyle::default());
        let c_sheet = read_zip_part(&v_bytes, C_PART_SHEET);

        assert!(c_sheet.contains(r#"<col min="1" max="1" width="3.7109375""#));
        assert!(c_sheet.contains(r#"<col min="2" max="2" width="6.7109375""#));
    }

    #[test]
    fn test_encode_workbook_with_style() {
        let sheet_style = SpecSheetStyle {
            if_bold_header: true,
            if_freeze_header: true,
        };
        let v_bytes = encode_single_sheet(create_sheet("People"), &sheet_style);

        let c_sheet = read_zip_part(&v_bytes, C_PART_SHEET);
        assert!(c_sheet.contains(r#"state="frozen""#));
        assert!(c_sheet.contains(r#"<c r="A1" s="1" t="s">"#));
        assert!(c_sheet.contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(read_zip_part(&v_bytes, "xl/styles.xml").contains("<b/>"));

        let v_bytes_plain = encode_single_sheet(create_sheet("People"), &SpecSheetStyle::default());
        assert!(!read_zip_part(&v_bytes_plain, C_PART_SHEET).contains("frozen"));
    }

    #[test]
    fn test_encode_workbook_cuts_oversized_text() {
        let mut sheet = create_sheet("People");
        sheet.rows[1][1] = EnumCellValue::Text("x".repeat(40_000));

        let v_bytes = encode_single_sheet(sheet, &SpecSheetStyle::default());
        let c_strings = read_zip_part(&v_bytes, C_PART_SHARED_STRINGS);

        let c_cut = format!("<t>{}</t>", "x".repeat(N_LEN_EXCEL_CELL_TEXT_MAX));
        assert!(c_strings.contains(&c_cut));
        assert!(!c_strings.contains(&"x".repeat(N_LEN_EXCEL_CELL_TEXT_MAX + 1)));
    }

    #[test]
    fn test_truncate_cell_text_counts_chars() {
        assert_eq!(truncate_cell_text("short"), None);
        assert_eq!(truncate_cell_text(&"x".repeat(N_LEN_EXCEL_CELL_TEXT_MAX)), None);

        let c_cut = truncate_cell_text(&"é".repeat(N_LEN_EXCEL_CELL_TEXT_MAX + 5)).unwrap();
        assert_eq!(c_cut.chars().count(), N_LEN_EXCEL_CELL_TEXT_MAX);
    }

    #[test]
    fn test_encode_workbook_rejects_unsanitized_sheet_name() {
        let workbook = SpecWorkbook {
            sheets: vec![create_sheet("a/b")],
        };

        assert!(matches!(
            encode_workbook(&workbook, &SpecSheetStyle::default()),
            Err(ExportError::XlsxEncode(_))
        ));
    }

    #[test]
    fn test_cast_bounds() {
        assert_eq!(cast_row_num(0).unwrap(), 0);
        assert!(matches!(
            cast_row_num(N_NROWS_EXCEL_MAX),
            Err(ExportError::IndexOverflow { axis: "row", .. })
        ));
        assert_eq!(cast_col_num(N_NCOLS_EXCEL_MAX - 1).unwrap(), 16_383);
        assert!(matches!(
            cast_col_num(N_NCOLS_EXCEL_MAX),
            Err(ExportError::IndexOverflow { axis: "column", .. })
        ));
    }
}
