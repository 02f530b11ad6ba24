use crate::error::LoadError;
use crate::schema::tables::{OCC_ARMA, OCC_CRIME};
use crate::schema::TableSchema;
use crate::transform::{CodeSlots, Rename};

use super::columns::*;
use super::{finish, LoadContext, TableRows};

fn associate(
    ctx: &LoadContext,
    schema: &'static TableSchema,
    slots: &CodeSlots,
    code_name: &'static str,
) -> Result<TableRows, LoadError> {
    let pairs = slots.explode(ctx.frame, Rename::integer(INCIDENT_ID, "occId"), code_name)?;
    finish(schema, pairs)
}

/// `(occId, crimeId)` for every distinct classification code of an incident
pub fn incident_crimes(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    associate(ctx, &OCC_CRIME, &CRIME_CODES, "crimeId")
}

pub fn incident_weapons(ctx: &LoadContext) -> Result<TableRows, LoadError> {
    associate(ctx, &OCC_ARMA, &WEAPON_CODES, "armaId")
}
