use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LoadError;
use crate::parser::SqlValue;

use super::rows::RowSet;

/// `MM/DD/YYYY` date substring + zero-padded `HHMM`
pub const OCCURRED_FORMAT: &str = "%m/%d/%Y %H%M";
pub const REPORTED_FORMAT: &str = "%m/%d/%Y";

/// SQLite canonical text forms
pub const TIMESTAMP_STORAGE: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_STORAGE: &str = "%Y-%m-%d";

/// The source dates carry a meaningless `12:00:00 AM` suffix
fn date_part(raw: &str) -> &str {
    let raw = raw.trim();
    raw.get(..10).unwrap_or(raw)
}

/// Combine a day-level date and an `HHMM` time of day
pub fn combine_occurrence(date: &str, time: &str) -> Option<NaiveDateTime> {
    let time = time.trim();
    if time.is_empty() || !time.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let stamp = format!("{} {:0>4}", date_part(date), time);
    NaiveDateTime::parse_from_str(&stamp, OCCURRED_FORMAT).ok()
}

pub fn parse_report_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_part(date), REPORTED_FORMAT).ok()
}

fn text_of(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
    }
}

/// Replace `date_col` with the combined occurrence timestamp and drop
/// `time_col`. Any unparseable row aborts with its row index.
pub fn normalize_occurrence(
    rows: &mut RowSet,
    date_col: &str,
    time_col: &str,
) -> Result<(), LoadError> {
    let date_idx = rows.column_index(date_col)?;
    let time_idx = rows.column_index(time_col)?;

    for (i, row) in rows.rows_mut().iter_mut().enumerate() {
        let date = text_of(&row[date_idx]);
        let time = text_of(&row[time_idx]);

        let stamp = combine_occurrence(&date, &time).ok_or_else(|| LoadError::Timestamp {
            row: i,
            field: "occurrence date/time",
            value: format!("{} {}", date, time),
        })?;
        row[date_idx] = SqlValue::Text(stamp.format(TIMESTAMP_STORAGE).to_string());
    }

    rows.drop_columns(&[time_col])
}

/// Replace a `MM/DD/YYYY ...` column with an ISO date
pub fn normalize_report(rows: &mut RowSet, date_col: &str) -> Result<(), LoadError> {
    let idx = rows.column_index(date_col)?;

    for (i, row) in rows.rows_mut().iter_mut().enumerate() {
        let raw = text_of(&row[idx]);
        let date = parse_report_date(&raw).ok_or_else(|| LoadError::Timestamp {
            row: i,
            field: "report date",
            value: raw.clone(),
        })?;
        row[idx] = SqlValue::Text(date.format(DATE_STORAGE).to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_combine_pads_time() {
        let ts = combine_occurrence("01/01/2023 12:00:00 AM", "1530").unwrap();
        assert_eq!(ts.format(TIMESTAMP_STORAGE).to_string(), "2023-01-01 15:30:00");

        let early = combine_occurrence("03/15/2021 12:00:00 AM", "5").unwrap();
        assert_eq!(early.format(TIMESTAMP_STORAGE).to_string(), "2021-03-15 00:05:00");
    }

    #[test]
    fn test_combine_rejects_garbage() {
        assert!(combine_occurrence("not a date", "1200").is_none());
        assert!(combine_occurrence("01/01/2023", "").is_none());
        assert!(combine_occurrence("01/01/2023", "2561").is_none());
        assert!(combine_occurrence("01/01/2023", "12:30").is_none());
    }

    #[test]
    fn test_report_date() {
        let d = parse_report_date("01/02/2023 12:00:00 AM").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    }

    #[test]
    fn test_normalize_occurrence_drops_time_column() {
        let mut rows = RowSet::new(["date_occ", "time_occ"]);
        rows.push(vec![text("01/01/2023 12:00:00 AM"), text("1530")]);

        normalize_occurrence(&mut rows, "date_occ", "time_occ").unwrap();
        assert_eq!(rows.columns(), &["date_occ".to_string()]);
        assert_eq!(rows.value(0, "date_occ"), Some(&text("2023-01-01 15:30:00")));
    }

    #[test]
    fn test_normalize_occurrence_reports_bad_row() {
        let mut rows = RowSet::new(["date_occ", "time_occ"]);
        rows.push(vec![text("01/01/2023"), text("0100")]);
        rows.push(vec![text("13/45/2023"), text("0100")]);

        let err = normalize_occurrence(&mut rows, "date_occ", "time_occ").unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 1, .. }));
    }

    #[test]
    fn test_normalize_report_null_is_error() {
        let mut rows = RowSet::new(["date_rptd"]);
        rows.push(vec![SqlValue::Null]);
        assert!(normalize_report(&mut rows, "date_rptd").is_err());
    }
}
