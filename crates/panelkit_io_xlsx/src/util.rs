//! Stateless helper utilities used by the export pipeline.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, Utc};
use regex::Regex;

use crate::conf::{
    C_FILE_EXTENSION_XLSX, C_PATTERN_NUMERIC_SHAPE, C_SHEET_NAME_ELLIPSIS, C_SHEET_NAME_FALLBACK,
    N_LEN_EXCEL_SHEET_NAME_MAX, N_LEN_SHEET_NAME_TRUNCATED, N_WIDTH_CELL_PADDING,
    N_WIDTH_EXCEL_COLUMN_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::error::ExportError;
use crate::spec::{EnumCellValue, EnumTimezone, SpecRowSet, SpecTimestampConfig};

static RE_NUMERIC_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(C_PATTERN_NUMERIC_SHAPE).expect("numeric shape pattern is a valid regex")
});

////////////////////////////////////////////////////////////////////////////////
// #region CellClassification

/// Classify one raw value as `Empty`, `Numeric` or `Text`.
///
/// Values made of ASCII digits, whitespace and at most one dot are numeric;
/// whitespace is thousands grouping and is dropped before parsing. A value
/// with that shape but no digit at all (`" "`, `"."`) stays `Text`, as does a
/// numeral too large for a finite `f64`. Signs and exponents are not
/// recognized.
pub fn classify_cell_value(raw: Option<&str>) -> EnumCellValue {
    let Some(c_raw) = raw else {
        return EnumCellValue::Empty;
    };
    if c_raw.is_empty() {
        return EnumCellValue::Empty;
    }

    if !RE_NUMERIC_SHAPE.is_match(c_raw) {
        return EnumCellValue::Text(c_raw.to_string());
    }

    let c_numeral: String = c_raw.chars().filter(|chr| !chr.is_whitespace()).collect();
    if !c_numeral.bytes().any(|b| b.is_ascii_digit()) {
        return EnumCellValue::Text(c_raw.to_string());
    }

    match c_numeral.parse::<f64>() {
        Ok(n_value) if n_value.is_finite() => EnumCellValue::Numeric(n_value),
        _ => EnumCellValue::Text(c_raw.to_string()),
    }
}

/// Classify every raw value of `row_set`, preserving row and field order.
pub fn classify_rows(row_set: &SpecRowSet) -> Vec<Vec<EnumCellValue>> {
    row_set
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| classify_cell_value(value.as_deref()))
                .collect()
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnLayout

/// Display length in characters of a classified value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::Empty => 0,
        EnumCellValue::Numeric(_) => value.to_display_string().chars().count(),
        EnumCellValue::Text(s) => s.chars().count(),
    }
}

/// Compute `max(header_len, widest value) + padding` per column, capped at
/// the Excel column width limit.
pub fn calculate_column_widths(header: &[String], rows: &[Vec<EnumCellValue>]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .map(|(n_idx_col, c_field)| {
            let n_width_body = rows
                .iter()
                .filter_map(|row| row.get(n_idx_col))
                .map(estimate_width_len)
                .max()
                .unwrap_or(0);
            let n_width = usize::max(c_field.chars().count(), n_width_body) + N_WIDTH_CELL_PADDING;
            n_width.min(N_WIDTH_EXCEL_COLUMN_MAX)
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNaming

/// Keep titles up to 31 chars; longer ones become 28 chars plus `...`.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= N_LEN_EXCEL_SHEET_NAME_MAX {
        return title.to_string();
    }
    let mut c_name: String = title.chars().take(N_LEN_SHEET_NAME_TRUNCATED).collect();
    c_name.push_str(C_SHEET_NAME_ELLIPSIS);
    c_name
}

/// Make a truncated title acceptable as a worksheet name.
///
/// Illegal characters become `replace_to`, surrounding apostrophes are
/// removed and the result never exceeds the sheet name limit.
pub fn sanitize_sheet_name(name: &str, replace_to: char) -> String {
    let c_name: String = name
        .chars()
        .map(|chr| {
            if TUP_EXCEL_ILLEGAL.contains(&chr) {
                replace_to
            } else {
                chr
            }
        })
        .collect();
    let c_name = c_name.trim_matches('\'');
    if c_name.trim().is_empty() {
        return C_SHEET_NAME_FALLBACK.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileNaming

/// Render `now` in the configured timezone and display format.
pub fn format_export_timestamp(
    now: DateTime<Utc>,
    timestamp_config: &SpecTimestampConfig,
) -> Result<String, ExportError> {
    let c_format = timestamp_config.format.as_str();
    let mut c_timestamp = String::new();
    let res_write = match timestamp_config.timezone {
        EnumTimezone::Local => write!(
            c_timestamp,
            "{}",
            now.with_timezone(&Local).format(c_format)
        ),
        EnumTimezone::Utc => write!(c_timestamp, "{}", now.format(c_format)),
        EnumTimezone::FixedOffset(n_secs) => {
            let tz = FixedOffset::east_opt(n_secs).ok_or_else(|| {
                ExportError::InvalidConfig(format!("timezone offset out of range: {n_secs}s"))
            })?;
            write!(c_timestamp, "{}", now.with_timezone(&tz).format(c_format))
        }
    };
    res_write.map_err(|_| {
        ExportError::InvalidConfig(format!("invalid timestamp format: {c_format:?}"))
    })?;
    Ok(c_timestamp)
}

/// Build `<truncated-title>-<timestamp>.xlsx`.
pub fn derive_export_file_name(truncated_title: &str, timestamp: &str) -> String {
    format!("{truncated_title}-{timestamp}.{C_FILE_EXTENSION_XLSX}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionParsing

/// Parse a one-character delimiter or quote option.
pub fn parse_single_ascii_byte(value: &str, name: &str) -> Result<u8, ExportError> {
    match value.as_bytes() {
        [n_byte] if n_byte.is_ascii() => Ok(*n_byte),
        _ => Err(ExportError::InvalidConfig(format!(
            "{name} must be a single ASCII character, got {value:?}"
        ))),
    }
}

/// Parse `local`, `utc` or a `+HH:MM` / `-HH:MM` offset.
pub fn parse_timezone(value: &str) -> Result<EnumTimezone, ExportError> {
    let c_value = value.trim().to_ascii_lowercase();
    match c_value.as_str() {
        "local" => return Ok(EnumTimezone::Local),
        "utc" | "z" => return Ok(EnumTimezone::Utc),
        _ => {}
    }

    let err_invalid = || {
        ExportError::InvalidConfig(format!(
            "timezone must be 'local', 'utc' or '+HH:MM', got {value:?}"
        ))
    };
    let (n_sign, c_offset) = if let Some(c_rest) = c_value.strip_prefix('+') {
        (1, c_rest)
    } else if let Some(c_rest) = c_value.strip_prefix('-') {
        (-1, c_rest)
    } else {
        return Err(err_invalid());
    };
    let (c_hours, c_minutes) = c_offset.split_once(':').ok_or_else(err_invalid)?;
    let n_hours: i32 = c_hours.parse().map_err(|_| err_invalid())?;
    let n_minutes: i32 = c_minutes.parse().map_err(|_| err_invalid())?;
    if !(0..=23).contains(&n_hours) || !(0..=59).contains(&n_minutes) {
        return Err(err_invalid());
    }
    Ok(EnumTimezone::FixedOffset(
        n_sign * (n_hours * 3600 + n_minutes * 60),
    ))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_classify_grouped_digits_as_numeric() {
        assert_eq!(
            classify_cell_value(Some("12 345")),
            EnumCellValue::Numeric(12345.0)
        );
        assert_eq!(
            classify_cell_value(Some(" 1 000.25 ")),
            EnumCellValue::Numeric(1000.25)
        );
        assert_eq!(classify_cell_value(Some(".5")), EnumCellValue::Numeric(0.5));
        assert_eq!(classify_cell_value(Some("7.")), EnumCellValue::Numeric(7.0));
    }

    #[test]
    fn test_classify_falls_through_to_text() {
        for c_raw in ["12a45", "-1", "1e5", "1.2.3", "1,5", "abc", "١٢٣"] {
            assert_eq!(
                classify_cell_value(Some(c_raw)),
                EnumCellValue::Text(c_raw.to_string()),
                "{c_raw:?}"
            );
        }
    }

    #[test]
    fn test_classify_digitless_shapes_as_text() {
        for c_raw in [" ", "   ", ".", " . "] {
            assert_eq!(
                classify_cell_value(Some(c_raw)),
                EnumCellValue::Text(c_raw.to_string())
            );
        }
    }

    #[test]
    fn test_classify_missing_and_blank_as_empty() {
        assert_eq!(classify_cell_value(None), EnumCellValue::Empty);
        assert_eq!(classify_cell_value(Some("")), EnumCellValue::Empty);
    }

    #[test]
    fn test_classify_overflowing_numeral_as_text() {
        let c_raw = "9".repeat(400);
        assert_eq!(
            classify_cell_value(Some(&c_raw)),
            EnumCellValue::Text(c_raw.clone())
        );
    }

    #[test]
    fn test_calculate_column_widths_uses_header_and_body() {
        let header = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec![
                EnumCellValue::Numeric(1.0),
                EnumCellValue::Text("Alice".to_string()),
            ],
            vec![
                EnumCellValue::Numeric(22.0),
                EnumCellValue::Text("Bob".to_string()),
            ],
        ];

        assert_eq!(calculate_column_widths(&header, &rows), vec![3, 6]);
    }

    #[test]
    fn test_calculate_column_widths_counts_chars_not_bytes() {
        let header = vec!["x".to_string()];
        let rows = vec![vec![EnumCellValue::Text("héllo".to_string())], vec![
            EnumCellValue::Empty,
        ]];

        assert_eq!(calculate_column_widths(&header, &rows), vec![6]);
    }

    #[test]
    fn test_calculate_column_widths_caps_at_excel_limit() {
        let header = vec!["n".to_string(), "t".to_string()];
        let c_numeral = format!("1{}", "0".repeat(300));
        let rows = vec![vec![
            classify_cell_value(Some(&c_numeral)),
            EnumCellValue::Text("y".repeat(254)),
        ]];

        assert_eq!(calculate_column_widths(&header, &rows), vec![255, 255]);
    }

    #[test]
    fn test_truncate_title() {
        let c_long = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";
        assert_eq!(c_long.len(), 40);
        let c_truncated = truncate_title(c_long);
        assert_eq!(c_truncated, "abcdefghijklmnopqrstuvwxyz01...");
        assert_eq!(c_truncated.chars().count(), 31);

        assert_eq!(truncate_title("twenty chars exactly"), "twenty chars exactly");
        let c_31 = "a".repeat(31);
        assert_eq!(truncate_title(&c_31), c_31);
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("CPU [host/a]", '_'), "CPU _host_a_");
        assert_eq!(sanitize_sheet_name("'quoted'", '_'), "quoted");
        assert_eq!(sanitize_sheet_name("", '_'), "Sheet");
        assert_eq!(sanitize_sheet_name("''", '_'), "Sheet");
    }

    #[test]
    fn test_format_export_timestamp_in_fixed_zones() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 22, 7, 9).unwrap();

        let cfg_utc = SpecTimestampConfig {
            timezone: EnumTimezone::Utc,
            ..Default::default()
        };
        assert_eq!(
            format_export_timestamp(now, &cfg_utc).unwrap(),
            "2024-03-05 22:07:09"
        );

        let cfg_offset = SpecTimestampConfig {
            timezone: EnumTimezone::FixedOffset(3 * 3600),
            ..Default::default()
        };
        assert_eq!(
            format_export_timestamp(now, &cfg_offset).unwrap(),
            "2024-03-06 01:07:09"
        );
    }

    #[test]
    fn test_format_export_timestamp_rejects_bad_config() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 22, 7, 9).unwrap();
        let cfg_bad_format = SpecTimestampConfig {
            format: "%Q".to_string(),
            timezone: EnumTimezone::Utc,
        };
        assert!(matches!(
            format_export_timestamp(now, &cfg_bad_format),
            Err(ExportError::InvalidConfig(_))
        ));

        let cfg_bad_offset = SpecTimestampConfig {
            timezone: EnumTimezone::FixedOffset(100_000),
            ..Default::default()
        };
        assert!(format_export_timestamp(now, &cfg_bad_offset).is_err());
    }

    #[test]
    fn test_derive_export_file_name() {
        assert_eq!(
            derive_export_file_name("Requests", "2024-03-05 22:07:09"),
            "Requests-2024-03-05 22:07:09.xlsx"
        );
    }

    #[test]
    fn test_parse_single_ascii_byte() {
        assert_eq!(parse_single_ascii_byte(";", "delimiter").unwrap(), b';');
        for c_bad in ["", ";;", "é"] {
            assert!(matches!(
                parse_single_ascii_byte(c_bad, "delimiter"),
                Err(ExportError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Local").unwrap(), EnumTimezone::Local);
        assert_eq!(parse_timezone(" UTC ").unwrap(), EnumTimezone::Utc);
        assert_eq!(
            parse_timezone("+03:00").unwrap(),
            EnumTimezone::FixedOffset(10_800)
        );
        assert_eq!(
            parse_timezone("-05:30").unwrap(),
            EnumTimezone::FixedOffset(-19_800)
        );
        for c_bad in ["Europe/Moscow", "+24:00", "+03", "03:00", "+03:60"] {
            assert!(
                matches!(parse_timezone(c_bad), Err(ExportError::InvalidConfig(_))),
                "{c_bad:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_classification_is_total(c_raw in any::<String>()) {
            match classify_cell_value(Some(&c_raw)) {
                EnumCellValue::Empty => prop_assert!(c_raw.is_empty()),
                EnumCellValue::Numeric(n) => prop_assert!(n.is_finite()),
                EnumCellValue::Text(s) => prop_assert_eq!(s, c_raw),
            }
        }

        #[test]
        fn prop_numeric_reclassification_is_stable(c_raw in "[0-9 ]{1,12}(\\.[0-9 ]{0,6})?") {
            if let EnumCellValue::Numeric(n_first) = classify_cell_value(Some(&c_raw)) {
                let c_display = EnumCellValue::Numeric(n_first).to_display_string();
                prop_assert_eq!(
                    classify_cell_value(Some(&c_display)),
                    EnumCellValue::Numeric(n_first)
                );
            }
        }
    }
}
