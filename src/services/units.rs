use rusqlite::Connection;

use crate::auth::RequestContext;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, Unit, UnitDetails, UnitRequest};
use crate::services::roster::write_with_access;

pub fn create(conn: &Connection, ctx: &RequestContext, req: UnitRequest) -> Result<Unit, AppError> {
    ensure_tenant(ctx, &req.barbershop)?;
    queries::get_barbershop(conn, &req.barbershop)?
        .ok_or_else(|| AppError::not_found("Barbershop not found"))?;
    req.operating_hours.validate().map_err(AppError::BadRequest)?;

    let unit = Unit {
        id: uuid::Uuid::new_v4().to_string(),
        barbershop_id: req.barbershop,
        address: req.address,
        phone_number: req.phone_number,
        description: req.description,
        operating_hours: req.operating_hours,
    };

    write_with_access(conn, &unit.id, &unit.barbershop_id, |tx| {
        queries::insert_unit(tx, &unit).map_err(duplicate_postal_code)
    })?;

    tracing::info!(unit_id = %unit.id, barbershop_id = %unit.barbershop_id, "unit created");
    Ok(unit)
}

pub fn list(conn: &Connection, barbershop_id: &str) -> Result<Vec<Unit>, AppError> {
    let units = queries::list_units(conn, barbershop_id)?;
    if units.is_empty() {
        return Err(AppError::not_found("No units found for this barbershop"));
    }
    Ok(units)
}

/// A unit with the barbers currently on its access list.
pub fn get(conn: &Connection, id: &str) -> Result<UnitDetails, AppError> {
    let unit = queries::get_unit(conn, id)?.ok_or_else(|| AppError::not_found("Unit not found"))?;
    let barbers = queries::list_unit_access(conn, &unit.id)?
        .into_iter()
        .filter(|u| u.role == Role::Barber)
        .collect();
    Ok(UnitDetails { unit, barbers })
}

pub fn update(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: UnitRequest,
) -> Result<Unit, AppError> {
    ensure_tenant(ctx, &req.barbershop)?;
    let mut unit = load_in_tenant(conn, ctx, id)?;
    req.operating_hours.validate().map_err(AppError::BadRequest)?;

    unit.address = req.address;
    unit.phone_number = req.phone_number;
    unit.description = req.description;
    unit.operating_hours = req.operating_hours;

    queries::update_unit(conn, &unit).map_err(duplicate_postal_code)?;
    tracing::info!(unit_id = %unit.id, "unit updated");
    Ok(unit)
}

pub fn delete(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let unit = load_in_tenant(conn, ctx, id)?;
    queries::delete_unit(conn, &unit.id)?;
    tracing::info!(unit_id = %unit.id, "unit deleted");
    Ok(())
}

fn load_in_tenant(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<Unit, AppError> {
    queries::get_unit(conn, id)?
        .filter(|u| u.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("Unit not found"))
}

fn ensure_tenant(ctx: &RequestContext, barbershop: &str) -> Result<(), AppError> {
    if barbershop != ctx.barbershop {
        return Err(AppError::forbidden("You do not have access to this barbershop."));
    }
    Ok(())
}

fn duplicate_postal_code(err: anyhow::Error) -> AppError {
    if queries::is_constraint_violation(&err) {
        AppError::conflict("A unit with this postal code already exists.")
    } else {
        AppError::Internal(err)
    }
}
