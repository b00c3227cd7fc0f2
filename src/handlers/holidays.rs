use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::{RequestContext, TenantScoped};
use crate::errors::AppError;
use crate::models::{Holiday, HolidayRequest, Role, UpdateHolidayRequest};
use crate::services::holidays;
use crate::state::AppState;

fn require_holiday_role(ctx: &RequestContext) -> Result<(), AppError> {
    ctx.require_role(&[Role::Admin, Role::Barber, Role::Developer])
}

// POST /holiday
pub async fn create(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<HolidayRequest>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    require_holiday_role(&ctx)?;

    let conn = state.conn()?;
    let holiday = holidays::create(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

// GET /holiday
pub async fn list(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
) -> Result<Json<Vec<Holiday>>, AppError> {
    require_holiday_role(&ctx)?;

    let conn = state.conn()?;
    Ok(Json(holidays::list(&conn, &ctx)?))
}

// GET /holiday/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<Holiday>, AppError> {
    require_holiday_role(&ctx)?;

    let conn = state.conn()?;
    Ok(Json(holidays::get(&conn, &ctx, &id)?))
}

// PATCH /holiday/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<UpdateHolidayRequest>,
) -> Result<Json<Holiday>, AppError> {
    require_holiday_role(&ctx)?;

    let conn = state.conn()?;
    Ok(Json(holidays::update(&conn, &ctx, &id, req)?))
}

// DELETE /holiday/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_holiday_role(&ctx)?;

    let conn = state.conn()?;
    holidays::delete(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
