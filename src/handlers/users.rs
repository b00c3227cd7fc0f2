use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::{RequestContext, TenantScoped};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::services::users;
use crate::state::AppState;

const USER_ADMINS: [Role; 2] = [Role::Admin, Role::Developer];

// POST /auth/users
pub async fn create(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    ctx.require_role(&USER_ADMINS)?;

    let conn = state.conn()?;
    let user = users::create(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /auth/users
pub async fn list(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
) -> Result<Json<Vec<User>>, AppError> {
    ctx.require_role(&USER_ADMINS)?;

    let conn = state.conn()?;
    Ok(Json(users::list(&conn, &ctx)?))
}

// GET /auth/users/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    ctx.require_role(&USER_ADMINS)?;

    let conn = state.conn()?;
    Ok(Json(users::get(&conn, &ctx, &id)?))
}

// PATCH /auth/users/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let conn = state.conn()?;
    Ok(Json(users::update(&conn, &ctx, &id, req)?))
}

// DELETE /auth/users/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.require_role(&USER_ADMINS)?;

    let conn = state.conn()?;
    users::delete(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
) -> Result<Json<User>, AppError> {
    let conn = state.conn()?;
    Ok(Json(users::me(&conn, &ctx)?))
}
