//! Sheet builder: classified rows + widths -> named sheet -> workbook.

use crate::spec::{SpecRowSet, SpecSheet, SpecWorkbook};
use crate::util::{calculate_column_widths, classify_rows, sanitize_sheet_name, truncate_title};

/// Classify `row_set`, compute widths and name the sheet after `title`.
pub fn build_sheet(row_set: &SpecRowSet, title: &str) -> SpecSheet {
    let l_rows = classify_rows(row_set);
    let l_widths = calculate_column_widths(&row_set.fields, &l_rows);

    let c_title_truncated = truncate_title(title);
    let c_sheet_name = sanitize_sheet_name(&c_title_truncated, '_');
    if c_sheet_name != c_title_truncated {
        tracing::warn!(
            title = %c_title_truncated,
            sheet_name = %c_sheet_name,
            "Sheet name adjusted for workbook compatibility"
        );
    }

    SpecSheet {
        name: c_sheet_name,
        header: row_set.fields.clone(),
        rows: l_rows,
        widths: l_widths,
    }
}

/// Place `sheet` into a fresh workbook.
pub fn build_workbook(sheet: SpecSheet) -> SpecWorkbook {
    SpecWorkbook {
        sheets: vec![sheet],
    }
}
