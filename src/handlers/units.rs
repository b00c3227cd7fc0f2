use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::TenantScoped;
use crate::errors::AppError;
use crate::models::{Role, Unit, UnitDetails, UnitRequest};
use crate::services::units;
use crate::state::AppState;

const UNIT_ADMINS: [Role; 2] = [Role::Admin, Role::Developer];

// GET /unit?barberShopId=
#[derive(Deserialize)]
pub struct UnitListQuery {
    #[serde(rename = "barberShopId")]
    pub barber_shop_id: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnitListQuery>,
) -> Result<Json<Vec<Unit>>, AppError> {
    let barbershop = query
        .barber_shop_id
        .ok_or_else(|| AppError::bad_request("The barberShopId query parameter is required."))?;

    let conn = state.conn()?;
    Ok(Json(units::list(&conn, &barbershop)?))
}

// GET /unit/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UnitDetails>, AppError> {
    let conn = state.conn()?;
    Ok(Json(units::get(&conn, &id)?))
}

// POST /unit
pub async fn create(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<UnitRequest>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    ctx.require_role(&UNIT_ADMINS)?;

    let conn = state.conn()?;
    let unit = units::create(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(unit)))
}

// PATCH /unit/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<UnitRequest>,
) -> Result<Json<Unit>, AppError> {
    ctx.require_role(&UNIT_ADMINS)?;

    let conn = state.conn()?;
    Ok(Json(units::update(&conn, &ctx, &id, req)?))
}

// DELETE /unit/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&UNIT_ADMINS)?;

    let conn = state.conn()?;
    units::delete(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
