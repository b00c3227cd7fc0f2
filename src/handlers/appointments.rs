use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::TenantScoped;
use crate::errors::AppError;
use crate::models::{AppointmentDetails, AppointmentRequest, AppointmentView, Role};
use crate::services::calendar_rules::parse_day;
use crate::services::{appointments, availability};
use crate::state::AppState;

// GET /appointment/available-times/:unit_id?date=
#[derive(Deserialize)]
pub struct AvailableTimesQuery {
    pub date: Option<String>,
}

pub async fn available_times(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<String>,
    Query(query): Query<AvailableTimesQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let raw = query
        .date
        .ok_or_else(|| AppError::bad_request("The date query parameter is required."))?;
    let date = parse_day(&raw)?;

    let conn = state.conn()?;
    let slots = availability::get_available_timeslots(&conn, &unit_id, date)?;
    Ok(Json(slots))
}

// POST /appointment
pub async fn create(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Json(req): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentView>), AppError> {
    let conn = state.conn()?;
    let appointment = appointments::create(&conn, &ctx, req)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /appointment/:id
pub async fn find_one(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetails>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::find_one(&conn, &ctx, &id)?))
}

// GET /appointment/user/:id
pub async fn find_by_user(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppointmentDetails>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::find_all_by_user(&conn, &ctx, &id)?))
}

// GET /appointment/client/:id
pub async fn find_by_client(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppointmentDetails>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::find_all_by_client(&conn, &ctx, &id)?))
}

// GET /appointment/barber/:id
pub async fn find_by_barber(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppointmentDetails>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::find_all_by_barber(&conn, &ctx, &id)?))
}

// GET /appointment/unit/:id
pub async fn find_by_unit(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppointmentDetails>>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::find_all_by_unit(&conn, &ctx, &id)?))
}

// PATCH /appointment/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
    Json(req): Json<AppointmentRequest>,
) -> Result<Json<AppointmentView>, AppError> {
    let conn = state.conn()?;
    Ok(Json(appointments::update(&conn, &ctx, &id, req)?))
}

// PATCH /appointment/:id/status
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, AppError> {
    ctx.require_role(&[Role::Barber, Role::Admin, Role::Developer])?;

    let conn = state.conn()?;
    Ok(Json(appointments::change_status(&conn, &ctx, &id)?))
}

// DELETE /appointment/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let conn = state.conn()?;
    appointments::remove(&conn, &ctx, &id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
