use rusqlite::Connection;

use crate::auth::RequestContext;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Holiday, HolidayRequest, UpdateHolidayRequest};
use crate::services::calendar_rules::parse_day;

pub fn create(conn: &Connection, ctx: &RequestContext, req: HolidayRequest) -> Result<Holiday, AppError> {
    if req.barbershop != ctx.barbershop {
        return Err(AppError::forbidden("You do not have access to this barbershop."));
    }
    queries::get_barbershop(conn, &req.barbershop)?
        .ok_or_else(|| AppError::not_found("Barbershop not found"))?;

    let holiday = Holiday {
        id: uuid::Uuid::new_v4().to_string(),
        barbershop_id: req.barbershop,
        name: req.name,
        date: parse_day(&req.date)?,
    };

    queries::insert_holiday(conn, &holiday).map_err(duplicate_date)?;
    tracing::info!(holiday_id = %holiday.id, date = %holiday.date, "holiday created");
    Ok(holiday)
}

pub fn list(conn: &Connection, ctx: &RequestContext) -> Result<Vec<Holiday>, AppError> {
    let holidays = queries::list_holidays(conn, &ctx.barbershop)?;
    if holidays.is_empty() {
        return Err(AppError::not_found("No holidays found"));
    }
    Ok(holidays)
}

pub fn get(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<Holiday, AppError> {
    queries::get_holiday(conn, id)?
        .filter(|h| h.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("Holiday not found"))
}

pub fn update(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: UpdateHolidayRequest,
) -> Result<Holiday, AppError> {
    let mut holiday = get(conn, ctx, id)?;

    if let Some(name) = req.name {
        holiday.name = name;
    }
    if let Some(date) = req.date {
        holiday.date = parse_day(&date)?;
    }

    queries::update_holiday(conn, &holiday).map_err(duplicate_date)?;
    Ok(holiday)
}

pub fn delete(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let holiday = get(conn, ctx, id)?;
    queries::delete_holiday(conn, &holiday.id)?;
    tracing::info!(holiday_id = %holiday.id, "holiday deleted");
    Ok(())
}

fn duplicate_date(err: anyhow::Error) -> AppError {
    if queries::is_constraint_violation(&err) {
        AppError::conflict("A holiday already exists on this date.")
    } else {
        AppError::Internal(err)
    }
}
