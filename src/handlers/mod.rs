pub mod appointments;
pub mod barbershops;
pub mod calendar;
pub mod health;
pub mod holidays;
pub mod services;
pub mod units;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));

    Router::new()
        .route("/health", get(health::health))
        // Appointments
        .route(
            "/appointment/available-times/:unit_id",
            get(appointments::available_times),
        )
        .route("/appointment", post(appointments::create))
        .route("/appointment/user/:id", get(appointments::find_by_user))
        .route("/appointment/client/:id", get(appointments::find_by_client))
        .route("/appointment/barber/:id", get(appointments::find_by_barber))
        .route("/appointment/unit/:id", get(appointments::find_by_unit))
        .route(
            "/appointment/:id",
            get(appointments::find_one)
                .patch(appointments::update)
                .delete(appointments::remove),
        )
        .route("/appointment/:id/status", patch(appointments::change_status))
        .route(
            "/appointment/:id/calendar.ics",
            get(calendar::download_ics),
        )
        // Barbershops
        .route(
            "/barbershop",
            get(barbershops::list).post(barbershops::create),
        )
        .route(
            "/barbershop/:id",
            get(barbershops::get)
                .patch(barbershops::update)
                .delete(barbershops::delete),
        )
        // Units
        .route("/unit", get(units::list).post(units::create))
        .route(
            "/unit/:id",
            get(units::get).patch(units::update).delete(units::delete),
        )
        // Holidays
        .route("/holiday", get(holidays::list).post(holidays::create))
        .route(
            "/holiday/:id",
            get(holidays::get)
                .patch(holidays::update)
                .delete(holidays::delete),
        )
        // Services
        .route(
            "/global-service",
            get(services::list_global).post(services::create_global),
        )
        .route(
            "/global-service/:id",
            get(services::get_global)
                .patch(services::update_global)
                .delete(services::delete_global),
        )
        .route(
            "/local-service",
            get(services::list_local).post(services::create_local),
        )
        .route(
            "/local-service/:id",
            get(services::get_local)
                .patch(services::update_local)
                .delete(services::delete_local),
        )
        .route(
            "/local-service/:id/:barber_id",
            delete(services::remove_local_barber),
        )
        // Users
        .route("/auth/users", get(users::list).post(users::create))
        .route(
            "/auth/users/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/auth/me", get(users::me))
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
