use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::RequestContext;
use crate::errors::AppError;
use crate::models::{Barbershop, BarbershopDetails, BarbershopRequest, Role, UpdateBarbershopRequest};
use crate::services::barbershops;
use crate::state::AppState;

// GET /barbershop
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Barbershop>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(barbershops::list(&conn)?))
}

// GET /barbershop/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BarbershopDetails>, AppError> {
    let conn = state.conn()?;
    Ok(Json(barbershops::get(&conn, &id)?))
}

// POST /barbershop
pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Json(req): Json<BarbershopRequest>,
) -> Result<(StatusCode, Json<Barbershop>), AppError> {
    ctx.require_role(&[Role::Developer])?;

    let conn = state.conn()?;
    let shop = barbershops::create(&conn, req)?;
    Ok((StatusCode::CREATED, Json(shop)))
}

// PATCH /barbershop/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateBarbershopRequest>,
) -> Result<Json<Barbershop>, AppError> {
    ctx.require_role(&[Role::Developer])?;

    let conn = state.conn()?;
    Ok(Json(barbershops::update(&conn, &id, req)?))
}

// DELETE /barbershop/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&[Role::Developer])?;

    let conn = state.conn()?;
    barbershops::delete(&conn, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
