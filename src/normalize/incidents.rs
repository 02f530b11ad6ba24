use crate::error::LoadError;
use crate::schema::tables::OCORRENCIAS;
use crate::transform::{project, timestamp, Rename};

use super::columns::*;
use super::{finish, LoadContext, TableRows};

/// The incident fact table.
///
/// Timestamps are parsed over the full source before key sanitizing, so a
/// malformed date anywhere aborts the run. With normalization off the raw
/// source text is kept.
pub fn incidents(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let mut rows = project(
        ctx.frame,
        &[
            Rename::integer(INCIDENT_ID, "occId"),
            Rename::integer(PREMISE_CODE, "localId"),
            Rename::integer(WEAPON_CODE, "armaId"),
            Rename::text(DATE_OCCURRED, "date_occ"),
            Rename::text(TIME_OCCURRED, "time_occ"),
            Rename::text(DATE_REPORTED, "date_rptd"),
        ],
    )?;
    rows.add_column("vitimaId", ctx.victim_ids());

    if ctx.normalize_timestamps {
        timestamp::normalize_occurrence(&mut rows, "date_occ", "time_occ")?;
        timestamp::normalize_report(&mut rows, "date_rptd")?;
    } else {
        rows.drop_columns(&["time_occ"])?;
    }

    finish(&OCORRENCIAS, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::fixtures::{frame, SCENARIO_ROW};
    use crate::parser::SqlValue;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_scenario_incident() {
        let frame = frame(&[SCENARIO_ROW]);
        let ctx = LoadContext::new(&frame, true);

        let table = incidents(&ctx).unwrap();
        let rows = &table.rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.value(0, "occId"), Some(&SqlValue::Integer(100)));
        assert_eq!(rows.value(0, "vitimaId"), Some(&SqlValue::Integer(0)));
        assert_eq!(rows.value(0, "localId"), Some(&SqlValue::Integer(101)));
        assert_eq!(rows.value(0, "armaId"), Some(&SqlValue::Null));
        assert_eq!(rows.value(0, "date_occ"), Some(&text("2023-01-01 15:30:00")));
        assert_eq!(rows.value(0, "date_rptd"), Some(&text("2023-01-02")));
        assert!(rows.column_index("time_occ").is_err());
    }

    #[test]
    fn test_duplicate_incident_keeps_first_row() {
        let second = SCENARIO_ROW.replace("101,Street", "202,Alley");
        let frame = frame(&[SCENARIO_ROW, second.as_str()]);
        let ctx = LoadContext::new(&frame, true);

        let table = incidents(&ctx).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows.value(0, "localId"), Some(&SqlValue::Integer(101)));
        assert_eq!(table.rows.value(0, "vitimaId"), Some(&SqlValue::Integer(0)));
        assert_eq!(table.stats.duplicates, 1);
    }

    #[test]
    fn test_fast_mode_keeps_raw_dates() {
        let frame = frame(&[SCENARIO_ROW]);
        let ctx = LoadContext::new(&frame, false);

        let table = incidents(&ctx).unwrap();
        assert_eq!(
            table.rows.value(0, "date_occ"),
            Some(&text("01/01/2023 12:00:00 AM"))
        );
        assert!(table.rows.column_index("time_occ").is_err());
    }

    #[test]
    fn test_bad_time_aborts() {
        let bad = SCENARIO_ROW.replace(",1530,", ",9999,");
        let frame = frame(&[SCENARIO_ROW, bad.as_str()]);
        let ctx = LoadContext::new(&frame, true);

        let err = incidents(&ctx).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 1, .. }));
    }
}
