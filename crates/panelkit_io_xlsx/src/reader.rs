//! Row parser: delimited text -> header-width rows.

use csv::{ReaderBuilder, StringRecord};

use crate::conf::C_EXCEL_SEPARATOR_HINT;
use crate::error::ExportError;
use crate::spec::{SpecCsvConfig, SpecRowSet};

/// Parse `text` into fields plus positional rows.
///
/// The first record is the header unless `if_include_header` is off, in which
/// case fields are named `column_1..column_n`. Short records are padded with
/// `None`; surplus values are dropped. Blank lines are skipped.
pub fn parse_delimited_text(
    text: &str,
    csv_config: &SpecCsvConfig,
) -> Result<SpecRowSet, ExportError> {
    let (c_body, n_delimiter) = strip_excel_separator_hint(text, csv_config.delimiter);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(n_delimiter)
        .quote(csv_config.quote_char)
        .from_reader(c_body.as_bytes());

    let mut l_records: Vec<StringRecord> = Vec::new();
    for res_record in reader.records() {
        l_records.push(res_record?);
    }

    let n_width_widest = l_records.iter().map(StringRecord::len).max().unwrap_or(0);
    let mut iter_records = l_records.into_iter();
    let l_fields: Vec<String> = if csv_config.if_include_header {
        iter_records
            .next()
            .map(|record| record.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    } else {
        (1..=n_width_widest)
            .map(|n_idx| format!("column_{n_idx}"))
            .collect()
    };

    let n_width = l_fields.len();
    let mut n_rows_truncated = 0usize;
    let l_rows: Vec<Vec<Option<String>>> = iter_records
        .map(|record| {
            if record.len() > n_width {
                n_rows_truncated += 1;
            }
            let mut l_values: Vec<Option<String>> = record
                .iter()
                .take(n_width)
                .map(|value| Some(value.to_string()))
                .collect();
            l_values.resize(n_width, None);
            l_values
        })
        .collect();

    if n_rows_truncated > 0 {
        tracing::warn!(
            n_rows_truncated,
            n_width,
            "Dropped values beyond the header width"
        );
    }
    tracing::debug!(
        n_fields = n_width,
        n_rows = l_rows.len(),
        "Parsed delimited text"
    );

    Ok(SpecRowSet {
        fields: l_fields,
        rows: l_rows,
    })
}

/// Drop a leading `sep=<byte>` line and return the delimiter it names.
fn strip_excel_separator_hint(text: &str, delimiter_default: u8) -> (&str, u8) {
    let Some(c_rest) = text.strip_prefix(C_EXCEL_SEPARATOR_HINT) else {
        return (text, delimiter_default);
    };
    let (c_line, c_body) = c_rest.split_once('\n').unwrap_or((c_rest, ""));
    match c_line.trim_end_matches('\r').as_bytes() {
        [n_delimiter] if n_delimiter.is_ascii() => (c_body, *n_delimiter),
        _ => (text, delimiter_default),
    }
}
