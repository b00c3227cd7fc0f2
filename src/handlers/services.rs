use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::TenantScoped;
use crate::errors::AppError;
use crate::models::{
    CreateGlobalServiceRequest, CreateLocalServiceRequest, GlobalService, LocalService, Role,
    UpdateGlobalServiceRequest, UpdateLocalServiceRequest,
};
use crate::services::catalog;
use crate::state::AppState;

// POST /global-service
pub async fn create_global(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<CreateGlobalServiceRequest>,
) -> Result<(StatusCode, Json<GlobalService>), AppError> {
    ctx.require_role(&[Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    let service = catalog::create_global(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(service)))
}

// GET /global-service
pub async fn list_global(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
) -> Result<Json<Vec<GlobalService>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(catalog::list_global(&conn, &ctx)?))
}

// GET /global-service/:id
pub async fn get_global(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<GlobalService>, AppError> {
    let conn = state.conn()?;
    Ok(Json(catalog::get_global(&conn, &ctx, &id)?))
}

// PATCH /global-service/:id
pub async fn update_global(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<UpdateGlobalServiceRequest>,
) -> Result<Json<GlobalService>, AppError> {
    ctx.require_role(&[Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    Ok(Json(catalog::update_global(&conn, &ctx, &id, req)?))
}

// DELETE /global-service/:id
pub async fn delete_global(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&[Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    catalog::delete_global(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// POST /local-service
pub async fn create_local(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<CreateLocalServiceRequest>,
) -> Result<(StatusCode, Json<LocalService>), AppError> {
    ctx.require_role(&[Role::Barber, Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    let service = catalog::create_local(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(service)))
}

// GET /local-service?unitId=
#[derive(Deserialize)]
pub struct LocalServiceQuery {
    #[serde(rename = "unitId")]
    pub unit_id: Option<String>,
}

pub async fn list_local(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Query(query): Query<LocalServiceQuery>,
) -> Result<Json<Vec<LocalService>>, AppError> {
    let unit_id = query
        .unit_id
        .ok_or_else(|| AppError::bad_request("The unitId query parameter is required."))?;

    let conn = state.conn()?;
    Ok(Json(catalog::list_local(&conn, &ctx, &unit_id)?))
}

// GET /local-service/:id
pub async fn get_local(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<LocalService>, AppError> {
    let conn = state.conn()?;
    Ok(Json(catalog::get_local(&conn, &ctx, &id)?))
}

// PATCH /local-service/:id
pub async fn update_local(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<UpdateLocalServiceRequest>,
) -> Result<Json<LocalService>, AppError> {
    ctx.require_role(&[Role::Barber, Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    Ok(Json(catalog::update_local(&conn, &ctx, &id, req)?))
}

// DELETE /local-service/:id
pub async fn delete_local(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&[Role::Barber, Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    catalog::delete_local(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// DELETE /local-service/:id/:barber_id
pub async fn remove_local_barber(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path((id, barber_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&[Role::Barber, Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    let service = catalog::remove_local_barber(&conn, &ctx, &id, &barber_id)?;
    Ok(Json(serde_json::json!({ "deleted": service.is_none(), "service": service })))
}
