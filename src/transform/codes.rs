//! Multi-valued code fields spread over parallel source columns
//!
//! An incident carries up to N codes of the same kind (e.g. a primary and a
//! secondary crime classification). Each column is a slot; per row the slots
//! collapse into one de-duplicated list of codes, which is then exploded into
//! association rows.

use crate::error::LoadError;
use crate::parser::{SourceFrame, SqlValue};

use super::project::{project, Rename};
use super::rows::RowSet;

/// One source code column, optionally paired with a description column
#[derive(Debug, Clone, Copy)]
pub struct CodeSlot {
    pub code: &'static str,
    pub description: Option<&'static str>,
}

impl CodeSlot {
    pub const fn described(code: &'static str, description: &'static str) -> Self {
        Self {
            code,
            description: Some(description),
        }
    }

    pub const fn bare(code: &'static str) -> Self {
        Self {
            code,
            description: None,
        }
    }
}

/// Parallel optional code columns read as one list per row
#[derive(Debug, Clone, Copy)]
pub struct CodeSlots {
    pub slots: &'static [CodeSlot],
}

impl CodeSlots {
    pub const fn new(slots: &'static [CodeSlot]) -> Self {
        Self { slots }
    }

    /// Entity candidates: `(code, description)` rows from every slot,
    /// slot after slot, so described slots come first under first-wins.
    pub fn candidates(
        &self,
        frame: &SourceFrame,
        code_name: &'static str,
        description_name: &'static str,
    ) -> Result<RowSet, LoadError> {
        let mut all = RowSet::new([code_name, description_name]);

        for slot in self.slots {
            let mut renames = vec![Rename::integer(slot.code, code_name)];
            if let Some(desc) = slot.description {
                renames.push(Rename::text(desc, description_name));
            }

            let mut rows = project(frame, &renames)?;
            if slot.description.is_none() {
                rows.add_column(description_name, std::iter::empty());
            }
            all.append(rows)?;
        }

        Ok(all)
    }

    /// Association candidates: one `(id, code)` row per distinct non-null
    /// code of each source row. Rows with no codes contribute nothing.
    pub fn explode(
        &self,
        frame: &SourceFrame,
        id: Rename,
        code_name: &'static str,
    ) -> Result<RowSet, LoadError> {
        let mut renames = vec![id];
        renames.extend(self.slots.iter().map(|s| Rename::integer(s.code, s.code)));
        let wide = project(frame, &renames)?;

        let mut pairs = RowSet::new([id.target, code_name]);
        pairs.add_rejected(wide.rejected());

        for row in wide.rows() {
            let (id_value, slots) = row.split_at(1);
            for code in distinct_codes(slots) {
                pairs.push(vec![id_value[0].clone(), SqlValue::Integer(code)]);
            }
        }

        Ok(pairs)
    }
}

/// Distinct non-null integer codes in slot order
pub fn distinct_codes(values: &[SqlValue]) -> Vec<i64> {
    let mut codes = Vec::with_capacity(values.len());
    for code in values.iter().filter_map(SqlValue::as_i64) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    static CRIME: CodeSlots = CodeSlots::new(&[
        CodeSlot::described("Crm Cd 1", "Crm Cd Desc"),
        CodeSlot::bare("Crm Cd 2"),
    ]);

    fn frame() -> SourceFrame {
        let csv = "DR_NO,Crm Cd 1,Crm Cd 2,Crm Cd Desc\n\
                   100,510,998,VEHICLE - STOLEN\n\
                   101,624,624,BATTERY\n\
                   102,,,\n\
                   103,,740,\n";
        SourceFrame::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_distinct_codes() {
        let values = [SqlValue::Integer(5), SqlValue::Null, SqlValue::Integer(5)];
        assert_eq!(distinct_codes(&values), vec![5]);
        assert!(distinct_codes(&[SqlValue::Null, SqlValue::Null]).is_empty());
    }

    #[test]
    fn test_explode_zero_one_or_two_rows() {
        let pairs = CRIME
            .explode(&frame(), Rename::integer("DR_NO", "occId"), "crimeId")
            .unwrap();

        let got: Vec<(i64, i64)> = pairs
            .rows()
            .iter()
            .map(|r| (r[0].as_i64().unwrap(), r[1].as_i64().unwrap()))
            .collect();
        assert_eq!(got, vec![(100, 510), (100, 998), (101, 624), (103, 740)]);
    }

    #[test]
    fn test_candidates_primary_slot_first() {
        let rows = CRIME.candidates(&frame(), "crimeId", "desc_crime").unwrap();

        assert_eq!(rows.len(), 8);
        assert_eq!(
            rows.value(0, "desc_crime"),
            Some(&SqlValue::Text("VEHICLE - STOLEN".into()))
        );
        assert_eq!(rows.value(4, "crimeId"), Some(&SqlValue::Integer(998)));
        assert_eq!(rows.value(4, "desc_crime"), Some(&SqlValue::Null));
    }
}
