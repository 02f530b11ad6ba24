use crate::error::LoadError;
use crate::parser::SqlValue;
use crate::schema::tables::{ARMAS, AREAS, CRIMES, LOCAIS, VITIMAS};
use crate::transform::{project, Rename, DESCENT};

use super::columns::*;
use super::{finish, LoadContext, TableRows};

/// Description stored for crime codes that only appear without one
pub const UNKNOWN_CRIME: &str = "Unknown";

pub fn areas(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let rows = project(
        ctx.frame,
        &[Rename::integer(AREA, "areaId"), Rename::text(AREA_NAME, "nome")],
    )?;
    finish(&AREAS, rows)
}

/// Locations keyed by premise code, with `"LAT LON"` coordinates
pub fn locations(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let mut rows = project(
        ctx.frame,
        &[
            Rename::integer(PREMISE_CODE, "localId"),
            Rename::integer(AREA, "areaId"),
            Rename::text(STREET, "morada"),
            Rename::text(PREMISE_DESC, "desc_local"),
            Rename::real(LATITUDE, "lat"),
            Rename::real(LONGITUDE, "lon"),
        ],
    )?;

    let lat = rows.column_index("lat")?;
    let lon = rows.column_index("lon")?;
    rows.derive_column("coordenadas", |row| coordinates(&row[lat], &row[lon]));
    rows.drop_columns(&["lat", "lon"])?;

    finish(&LOCAIS, rows)
}

fn coordinates(lat: &SqlValue, lon: &SqlValue) -> SqlValue {
    match (lat.as_f64(), lon.as_f64()) {
        // Debug keeps the trailing `.0` on whole numbers
        (Some(lat), Some(lon)) => SqlValue::Text(format!("{:?} {:?}", lat, lon)),
        _ => SqlValue::Null,
    }
}

pub fn weapons(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let rows = WEAPON_CODES.candidates(ctx.frame, "armaId", "desc_arma")?;
    finish(&ARMAS, rows)
}

/// One victim per source row under a run-scoped id, descent remapped
pub fn victims(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let mut rows = project(
        ctx.frame,
        &[
            Rename::integer(VICTIM_AGE, "idade"),
            Rename::text(VICTIM_SEX, "sexo"),
            Rename::text(VICTIM_DESCENT, "descendencia"),
        ],
    )?;
    rows.add_column("vitimaId", ctx.victim_ids());

    let fallbacks = DESCENT.apply(&mut rows, "descendencia")?;
    if fallbacks > 0 {
        tracing::info!(fallbacks, label = DESCENT.fallback(), "unmapped descent codes");
    }

    finish(&VITIMAS, rows)
}

/// Crime codes from both classification columns.
///
/// Primary-code rows come first so a described code wins over a bare
/// secondary one; codes left without a description get `Unknown`.
pub fn crimes(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    let rows = CRIME_CODES.candidates(ctx.frame, "crimeId", "desc_crime")?;
    let mut table = finish(&CRIMES, rows)?;

    table.rows.map_column("desc_crime", |desc| {
        if desc.is_null() {
            *desc = SqlValue::Text(UNKNOWN_CRIME.to_string());
        }
    })?;

    Ok(table)
}
