use rusqlite::Connection;

use crate::auth::RequestContext;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    CreateGlobalServiceRequest, CreateLocalServiceRequest, GlobalService, LocalService, Role,
    UpdateGlobalServiceRequest, UpdateLocalServiceRequest,
};
use crate::services::validation::{validate_barber, validate_unit_exists};

// ── Global ──

pub fn create_global(
    conn: &Connection,
    ctx: &RequestContext,
    req: CreateGlobalServiceRequest,
) -> Result<GlobalService, AppError> {
    ensure_tenant(ctx, &req.barbershop)?;
    queries::get_barbershop(conn, &req.barbershop)?
        .ok_or_else(|| AppError::not_found("Barbershop not found"))?;
    validate_offer(req.price, req.duration)?;

    let service = GlobalService {
        id: uuid::Uuid::new_v4().to_string(),
        barbershop_id: req.barbershop,
        name: req.name,
        description: req.description,
        price: req.price,
        duration_minutes: req.duration,
    };

    queries::insert_global_service(conn, &service).map_err(duplicate_name)?;
    tracing::info!(service_id = %service.id, name = %service.name, "global service created");
    Ok(service)
}

pub fn list_global(conn: &Connection, ctx: &RequestContext) -> Result<Vec<GlobalService>, AppError> {
    let services = queries::list_global_services(conn, &ctx.barbershop)?;
    if services.is_empty() {
        return Err(AppError::not_found("No global services found"));
    }
    Ok(services)
}

pub fn get_global(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<GlobalService, AppError> {
    queries::get_global_service(conn, id)?
        .filter(|s| s.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("Global service not found"))
}

pub fn update_global(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: UpdateGlobalServiceRequest,
) -> Result<GlobalService, AppError> {
    let mut service = get_global(conn, ctx, id)?;
    if let Some(name) = req.name {
        service.name = name;
    }
    if let Some(description) = req.description {
        service.description = description;
    }
    service.price = req.price.unwrap_or(service.price);
    service.duration_minutes = req.duration.unwrap_or(service.duration_minutes);
    validate_offer(service.price, service.duration_minutes)?;

    queries::update_global_service(conn, &service).map_err(duplicate_name)?;
    tracing::info!(service_id = %service.id, "global service updated");
    Ok(service)
}

pub fn delete_global(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let service = get_global(conn, ctx, id)?;
    queries::delete_global_service(conn, &service.id)?;
    tracing::info!(service_id = %service.id, "global service deleted");
    Ok(())
}

// ── Local ──

/// Creates a unit-specific service. Every listed barber must work for the
/// barbershop, and a barber may only create services they perform.
pub fn create_local(
    conn: &Connection,
    ctx: &RequestContext,
    req: CreateLocalServiceRequest,
) -> Result<LocalService, AppError> {
    ensure_tenant(ctx, &req.barbershop)?;
    let unit = validate_unit_exists(conn, &req.unit, Some(&ctx.barbershop))?;
    validate_offer(req.price, req.duration)?;

    if req.barbers.is_empty() {
        return Err(AppError::bad_request("At least one barber is required."));
    }
    for barber_id in &req.barbers {
        validate_barber(conn, barber_id, &ctx.barbershop)?;
    }
    if ctx.role == Role::Barber && !req.barbers.contains(&ctx.user_id) {
        return Err(AppError::forbidden(
            "Barbers can only create services they perform.",
        ));
    }

    let mut barbers = req.barbers;
    barbers.sort();
    barbers.dedup();

    let service = LocalService {
        id: uuid::Uuid::new_v4().to_string(),
        barbershop_id: req.barbershop,
        unit_id: unit.id,
        name: req.name,
        description: req.description,
        price: req.price,
        duration_minutes: req.duration,
        barbers,
    };

    queries::insert_local_service(conn, &service).map_err(duplicate_name)?;
    tracing::info!(service_id = %service.id, unit_id = %service.unit_id, "local service created");
    Ok(service)
}

pub fn list_local(
    conn: &Connection,
    ctx: &RequestContext,
    unit_id: &str,
) -> Result<Vec<LocalService>, AppError> {
    let services = queries::list_local_services(conn, &ctx.barbershop, unit_id)?;
    if services.is_empty() {
        return Err(AppError::not_found("No local services found for this unit"));
    }
    Ok(services)
}

pub fn get_local(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<LocalService, AppError> {
    queries::get_local_service(conn, id)?
        .filter(|s| s.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("Local service not found"))
}

/// Edits a local service. A barber may only edit services they perform and
/// cannot drop themselves from the barber list.
pub fn update_local(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: UpdateLocalServiceRequest,
) -> Result<LocalService, AppError> {
    let mut service = get_local(conn, ctx, id)?;
    if ctx.role == Role::Barber && !service.barbers.contains(&ctx.user_id) {
        return Err(AppError::forbidden(
            "Barbers can only update services they perform.",
        ));
    }

    if let Some(name) = req.name {
        service.name = name;
    }
    if let Some(description) = req.description {
        service.description = description;
    }
    service.price = req.price.unwrap_or(service.price);
    service.duration_minutes = req.duration.unwrap_or(service.duration_minutes);
    validate_offer(service.price, service.duration_minutes)?;

    if let Some(mut barbers) = req.barbers {
        if barbers.is_empty() {
            return Err(AppError::bad_request("At least one barber is required."));
        }
        for barber_id in &barbers {
            validate_barber(conn, barber_id, &ctx.barbershop)?;
        }
        if ctx.role == Role::Barber && !barbers.contains(&ctx.user_id) {
            return Err(AppError::forbidden(
                "Barbers cannot remove themselves from a service.",
            ));
        }
        barbers.sort();
        barbers.dedup();
        service.barbers = barbers;
    }

    queries::update_local_service(conn, &service).map_err(duplicate_name)?;
    tracing::info!(service_id = %service.id, barbers = service.barbers.len(), "local service updated");
    Ok(service)
}

pub fn delete_local(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let service = get_local(conn, ctx, id)?;
    if ctx.role == Role::Barber && !service.barbers.contains(&ctx.user_id) {
        return Err(AppError::forbidden(
            "Barbers can only delete services they perform.",
        ));
    }
    queries::delete_local_service(conn, &service.id)?;
    tracing::info!(service_id = %service.id, "local service deleted");
    Ok(())
}

/// Takes a barber off a local service. The service is deleted with its last
/// barber. Barbers may only remove themselves.
pub fn remove_local_barber(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    barber_id: &str,
) -> Result<Option<LocalService>, AppError> {
    let mut service = get_local(conn, ctx, id)?;
    if ctx.role == Role::Barber && barber_id != ctx.user_id {
        return Err(AppError::forbidden("Barbers can only remove themselves from a service."));
    }
    if !service.barbers.iter().any(|b| b == barber_id) {
        return Err(AppError::not_found("Barber not found"));
    }

    service.barbers.retain(|b| b != barber_id);
    if service.barbers.is_empty() {
        queries::delete_local_service(conn, &service.id)?;
        tracing::info!(service_id = %service.id, "local service deleted with its last barber");
        return Ok(None);
    }

    queries::update_local_service(conn, &service)?;
    tracing::info!(service_id = %service.id, barber_id, "barber removed from local service");
    Ok(Some(service))
}

fn validate_offer(price: f64, duration: i64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::bad_request("Price must be a non-negative number."));
    }
    if duration <= 0 {
        return Err(AppError::bad_request("Duration must be a positive number of minutes."));
    }
    Ok(())
}

fn ensure_tenant(ctx: &RequestContext, barbershop: &str) -> Result<(), AppError> {
    if barbershop != ctx.barbershop {
        return Err(AppError::forbidden("You do not have access to this barbershop."));
    }
    Ok(())
}

fn duplicate_name(err: anyhow::Error) -> AppError {
    if queries::is_constraint_violation(&err) {
        AppError::conflict("A service with this name already exists.")
    } else {
        AppError::Internal(err)
    }
}
