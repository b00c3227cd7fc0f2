use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Barbershop, BarbershopDetails, BarbershopRequest, UpdateBarbershopRequest};

pub fn create(conn: &Connection, req: BarbershopRequest) -> Result<Barbershop, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Name is required."));
    }

    let shop = Barbershop {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        phone_number: req.phone_number,
        email: req.email,
    };
    queries::insert_barbershop(conn, &shop)?;

    tracing::info!(barbershop_id = %shop.id, name = %shop.name, "barbershop created");
    Ok(shop)
}

pub fn list(conn: &Connection) -> Result<Vec<Barbershop>, AppError> {
    Ok(queries::list_barbershops(conn)?)
}

pub fn get(conn: &Connection, id: &str) -> Result<BarbershopDetails, AppError> {
    let barbershop =
        queries::get_barbershop(conn, id)?.ok_or_else(|| AppError::not_found("Barbershop not found"))?;
    let units = queries::list_units(conn, id)?.into_iter().map(|u| u.id).collect();
    Ok(BarbershopDetails { barbershop, units })
}

pub fn update(conn: &Connection, id: &str, req: UpdateBarbershopRequest) -> Result<Barbershop, AppError> {
    let mut shop =
        queries::get_barbershop(conn, id)?.ok_or_else(|| AppError::not_found("Barbershop not found"))?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Name is required."));
        }
        shop.name = name;
    }
    if let Some(description) = req.description {
        shop.description = Some(description);
    }
    if let Some(phone_number) = req.phone_number {
        shop.phone_number = phone_number;
    }
    if let Some(email) = req.email {
        shop.email = email;
    }

    queries::update_barbershop(conn, &shop)?;
    tracing::info!(barbershop_id = %shop.id, "barbershop updated");
    Ok(shop)
}

/// Removes a barbershop with its units, staff, services and bookings.
pub fn delete(conn: &Connection, id: &str) -> Result<(), AppError> {
    if !queries::delete_barbershop(conn, id)? {
        return Err(AppError::not_found("Barbershop not found"));
    }
    tracing::info!(barbershop_id = id, "barbershop deleted");
    Ok(())
}
