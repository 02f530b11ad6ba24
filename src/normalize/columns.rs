//! Source headers of the LA "Crime Data from 2020 to Present" export

use crate::transform::{CodeSlot, CodeSlots};

pub const INCIDENT_ID: &str = "DR_NO";
pub const DATE_REPORTED: &str = "Date Rptd";
pub const DATE_OCCURRED: &str = "DATE OCC";
pub const TIME_OCCURRED: &str = "TIME OCC";

pub const AREA: &str = "AREA";
pub const AREA_NAME: &str = "AREA NAME";

pub const PREMISE_CODE: &str = "Premis Cd";
pub const PREMISE_DESC: &str = "Premis Desc";
pub const STREET: &str = "LOCATION";
pub const LATITUDE: &str = "LAT";
pub const LONGITUDE: &str = "LON";

pub const VICTIM_AGE: &str = "Vict Age";
pub const VICTIM_SEX: &str = "Vict Sex";
pub const VICTIM_DESCENT: &str = "Vict Descent";

pub const WEAPON_CODE: &str = "Weapon Used Cd";
pub const WEAPON_DESC: &str = "Weapon Desc";

pub const CRIME_CODE_PRIMARY: &str = "Crm Cd 1";
pub const CRIME_CODE_SECONDARY: &str = "Crm Cd 2";
/// Describes the primary code only
pub const CRIME_DESC: &str = "Crm Cd Desc";

/// Primary and secondary classification codes
pub static CRIME_CODES: CodeSlots = CodeSlots::new(&[
    CodeSlot::described(CRIME_CODE_PRIMARY, CRIME_DESC),
    CodeSlot::bare(CRIME_CODE_SECONDARY),
]);

pub static WEAPON_CODES: CodeSlots = CodeSlots::new(&[CodeSlot::described(WEAPON_CODE, WEAPON_DESC)]);

/// Every header the pipeline reads
pub fn required_columns() -> Vec<&'static str> {
    vec![
        INCIDENT_ID,
        DATE_REPORTED,
        DATE_OCCURRED,
        TIME_OCCURRED,
        AREA,
        AREA_NAME,
        PREMISE_CODE,
        PREMISE_DESC,
        STREET,
        LATITUDE,
        LONGITUDE,
        VICTIM_AGE,
        VICTIM_SEX,
        VICTIM_DESCENT,
        WEAPON_CODE,
        WEAPON_DESC,
        CRIME_CODE_PRIMARY,
        CRIME_CODE_SECONDARY,
        CRIME_DESC,
    ]
}
