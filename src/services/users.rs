use rusqlite::Connection;

use crate::auth::RequestContext;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::services::roster::write_with_barbershop_access;

/// Adds a user to the caller's barbershop. Barbers without explicit units
/// work at every unit of the shop; other roles are not linked to units.
pub fn create(conn: &Connection, ctx: &RequestContext, req: CreateUserRequest) -> Result<User, AppError> {
    if req.barbershop != ctx.barbershop {
        return Err(AppError::forbidden("You do not have access to this barbershop."));
    }
    if req.role == Role::Developer && ctx.role != Role::Developer {
        return Err(AppError::forbidden("Only developers can create developer accounts."));
    }
    if !req.email.contains('@') {
        return Err(AppError::bad_request("Invalid email address."));
    }
    if queries::email_exists(conn, &req.email)? {
        return Err(AppError::conflict("Email already registered."));
    }

    let units = resolve_units(conn, &req.barbershop, req.role, req.units, None)?;
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        phone_number: req.phone_number,
        role: req.role,
        barbershop_id: req.barbershop,
        units,
    };

    write_with_barbershop_access(conn, &user.barbershop_id, |tx| {
        queries::insert_user(tx, &user).map_err(duplicate_email)
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
    Ok(user)
}

/// Edits a user of the caller's barbershop. Clients and barbers may only edit
/// their own profile and cannot change role or units. Unit access is rebuilt
/// in the same transaction, so a barber moved between units loses sight of
/// the old unit's bookings immediately.
pub fn update(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: UpdateUserRequest,
) -> Result<User, AppError> {
    let mut user = get(conn, ctx, id)?;

    if !ctx.role.is_staff() {
        if user.id != ctx.user_id {
            return Err(AppError::forbidden("You can only update your own account."));
        }
        if req.role.is_some() || req.units.is_some() {
            return Err(AppError::forbidden("You cannot change your role or units."));
        }
    }
    if (user.role == Role::Developer || req.role == Some(Role::Developer)) && ctx.role != Role::Developer {
        return Err(AppError::forbidden("Only developers can manage developer accounts."));
    }

    if let Some(email) = req.email {
        if !email.contains('@') {
            return Err(AppError::bad_request("Invalid email address."));
        }
        if email != user.email && queries::email_exists(conn, &email)? {
            return Err(AppError::conflict("Email already registered."));
        }
        user.email = email;
    }
    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(phone_number) = req.phone_number {
        user.phone_number = Some(phone_number);
    }

    let role = req.role.unwrap_or(user.role);
    let current = (user.role == Role::Barber).then(|| std::mem::take(&mut user.units));
    user.units = resolve_units(conn, &user.barbershop_id, role, req.units, current)?;
    user.role = role;

    write_with_barbershop_access(conn, &user.barbershop_id, |tx| {
        if queries::update_user(tx, &user).map_err(duplicate_email)? {
            Ok(())
        } else {
            Err(AppError::not_found("User not found"))
        }
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), units = user.units.len(), "user updated");
    Ok(user)
}

pub fn delete(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let user = get(conn, ctx, id)?;
    if user.id == ctx.user_id {
        return Err(AppError::forbidden("You cannot delete your own account."));
    }
    if user.role == Role::Developer && ctx.role != Role::Developer {
        return Err(AppError::forbidden("Only developers can manage developer accounts."));
    }

    write_with_barbershop_access(conn, &user.barbershop_id, |tx| {
        queries::delete_user(tx, &user.id)?;
        Ok(())
    })?;

    tracing::info!(user_id = %user.id, "user deleted");
    Ok(())
}

pub fn list(conn: &Connection, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
    Ok(queries::list_users(conn, &ctx.barbershop)?)
}

pub fn get(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<User, AppError> {
    queries::get_user(conn, id)?
        .filter(|u| u.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub fn me(conn: &Connection, ctx: &RequestContext) -> Result<User, AppError> {
    get(conn, ctx, &ctx.user_id)
}

/// Picks the units a user is linked to. Only barbers carry units: explicit
/// ids must belong to the shop, a barber keeps `current` when none are given,
/// and otherwise works at every unit.
fn resolve_units(
    conn: &Connection,
    barbershop_id: &str,
    role: Role,
    requested: Option<Vec<String>>,
    current: Option<Vec<String>>,
) -> Result<Vec<String>, AppError> {
    let shop_units = queries::list_units(conn, barbershop_id)?;
    match (role, requested, current) {
        (Role::Barber, Some(units), _) if !units.is_empty() => {
            if let Some(unknown) = units.iter().find(|id| !shop_units.iter().any(|u| &u.id == *id)) {
                return Err(AppError::not_found(format!("Unit {unknown} not found")));
            }
            let mut units = units;
            units.sort();
            units.dedup();
            Ok(units)
        }
        (Role::Barber, None, Some(current)) => Ok(current),
        (Role::Barber, _, _) => Ok(shop_units.into_iter().map(|u| u.id).collect()),
        (_, Some(units), _) if !units.is_empty() => {
            Err(AppError::bad_request("Only barbers are linked to units."))
        }
        _ => Ok(vec![]),
    }
}

fn duplicate_email(err: anyhow::Error) -> AppError {
    if queries::is_constraint_violation(&err) {
        AppError::conflict("Email already registered.")
    } else {
        AppError::Internal(err)
    }
}
