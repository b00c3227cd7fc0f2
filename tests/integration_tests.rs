use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use tower::ServiceExt;

use barbershop::auth;
use barbershop::config::AppConfig;
use barbershop::db::{self, queries};
use barbershop::handlers;
use barbershop::models::{
    Address, Barbershop, DayHours, GlobalService, Holiday, OperatingHours, Role, Unit, User,
};
use barbershop::state::AppState;

const SECRET: &str = "test-secret";

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        jwt_secret: SECRET.to_string(),
        request_timeout_secs: 5,
        cors_origin: None,
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();

    for shop in ["shop", "other"] {
        queries::insert_barbershop(
            &conn,
            &Barbershop {
                id: shop.to_string(),
                name: format!("{shop} cuts"),
                description: None,
                phone_number: "555".to_string(),
                email: format!("{shop}@example.com"),
            },
        )
        .unwrap();
    }

    queries::insert_unit(
        &conn,
        &Unit {
            id: "unit".to_string(),
            barbershop_id: "shop".to_string(),
            address: Address {
                full_address: "Main St 1".to_string(),
                postal_code: "00001".to_string(),
                city: "Springfield".to_string(),
                state: "SP".to_string(),
                country: "Brazil".to_string(),
            },
            phone_number: "555".to_string(),
            description: String::new(),
            operating_hours: OperatingHours {
                monday: Some(DayHours::new("09:00", "12:00")),
                tuesday: Some(DayHours::new("09:00", "12:00")),
                ..Default::default()
            },
        },
    )
    .unwrap();

    for (id, role, units) in [
        ("barber", Role::Barber, vec!["unit".to_string()]),
        ("client-a", Role::Client, vec![]),
        ("client-b", Role::Client, vec![]),
        ("admin", Role::Admin, vec![]),
    ] {
        queries::insert_user(
            &conn,
            &User {
                id: id.to_string(),
                name: id.to_string(),
                email: format!("{id}@example.com"),
                phone_number: None,
                role,
                barbershop_id: "shop".to_string(),
                units,
            },
        )
        .unwrap();
    }

    queries::insert_global_service(
        &conn,
        &GlobalService {
            id: "svc".to_string(),
            barbershop_id: "shop".to_string(),
            name: "Cut".to_string(),
            description: "Classic cut".to_string(),
            price: 30.0,
            duration_minutes: 30,
        },
    )
    .unwrap();

    Arc::new(AppState::new(conn, test_config()))
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

fn token(user_id: &str, role: Role) -> String {
    auth::issue_token(SECRET, user_id, role, "shop", Duration::hours(1)).unwrap()
}

fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, bearer: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn booking(client: Option<&str>, guest: Option<&str>, date: &str) -> serde_json::Value {
    let mut body = serde_json::json!({
        "barber": "barber",
        "service": "svc",
        "serviceType": "global",
        "barbershop": "shop",
        "unit": "unit",
        "date": date,
    });
    if let Some(c) = client {
        body["client"] = c.into();
    }
    if let Some(g) = guest {
        body["guestName"] = g.into();
    }
    body
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn book(state: &Arc<AppState>, as_user: &str, role: Role, body: serde_json::Value) -> axum::response::Response {
    test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/appointment?barberShopId=shop",
            &token(as_user, role),
            body,
        ))
        .await
        .unwrap()
}

async fn timeslots(state: &Arc<AppState>, date: &str) -> serde_json::Value {
    let res = test_app(state.clone())
        .oneshot(get_request(
            &format!("/appointment/available-times/unit?date={date}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let res = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "ok");
}

// ── Auth ──

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/appointment/unit/unit?barberShopId=shop", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let bad = auth::issue_token("other-secret", "admin", Role::Admin, "shop", Duration::hours(1)).unwrap();
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/appointment/unit/unit?barberShopId=shop", Some(&bad)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tenant_mismatch_forbidden() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request(
            "/appointment/unit/unit?barberShopId=other",
            Some(&token("admin", Role::Admin)),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = body_json(res).await;
    assert_eq!(body["error"], "You do not have access to this barbershop.");
}

#[tokio::test]
async fn test_me_returns_caller() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/auth/me", Some(&token("barber", Role::Barber))))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["id"], "barber");
}

// ── Timeslots ──

#[tokio::test]
async fn test_open_day_timeslots() {
    let state = test_state();
    let slots = timeslots(&state, "2030-01-07").await;
    assert_eq!(slots, serde_json::json!(["09:00", "09:45", "10:30", "11:15"]));
}

#[tokio::test]
async fn test_closed_day_timeslots_rejected() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/appointment/available-times/unit?date=2030-01-06", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeslots_unknown_unit() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/appointment/available-times/nope?date=2030-01-07", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Appointments ──

#[tokio::test]
async fn test_booking_consumes_slot() {
    let state = test_state();

    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T10:30:00Z")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["date"], "2030-01-07T10:30:00Z");

    let slots = timeslots(&state, "2030-01-07").await;
    assert_eq!(slots, serde_json::json!(["09:00", "09:45", "11:15"]));
}

#[tokio::test]
async fn test_double_booking_conflict() {
    let state = test_state();

    let first = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = book(&state, "client-b", Role::Client, booking(Some("client-b"), None, "2030-01-07T09:00:00Z")).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_outside_hours_rejected() {
    let state = test_state();
    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T12:00:00Z")).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(body["error"], "The appointment time must be between 09:00 and 12:00.");
}

#[tokio::test]
async fn test_booking_on_holiday_rejected() {
    let state = test_state();
    {
        let conn = state.conn().unwrap();
        queries::insert_holiday(
            &conn,
            &Holiday {
                id: "h1".to_string(),
                barbershop_id: "shop".to_string(),
                name: "Founders Day".to_string(),
                date: chrono::NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            },
        )
        .unwrap();
    }

    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("Founders Day"));
}

#[tokio::test]
async fn test_booking_for_other_client_forbidden() {
    let state = test_state();
    let res = book(&state, "client-a", Role::Client, booking(Some("client-b"), None, "2030-01-07T09:00:00Z")).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guest_booking_by_barber() {
    let state = test_state();
    let res = book(&state, "barber", Role::Barber, booking(None, Some("Walk-in"), "2030-01-07T09:45:00Z")).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await;
    assert_eq!(body["guestName"], "Walk-in");
    assert!(body.get("client").is_none());
}

#[tokio::test]
async fn test_reschedule_and_complete() {
    let state = test_state();

    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(json_request(
            "PATCH",
            &format!("/appointment/{id}?barberShopId=shop"),
            &token("client-a", Role::Client),
            booking(Some("client-a"), None, "2030-01-08T10:30:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["date"], "2030-01-08T10:30:00Z");

    // Monday's slot is free again.
    let slots = timeslots(&state, "2030-01-07").await;
    assert_eq!(slots, serde_json::json!(["09:00", "09:45", "10:30", "11:15"]));

    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/appointment/{id}/status?barberShopId=shop"))
                .header(header::AUTHORIZATION, format!("Bearer {}", token("barber", Role::Barber)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "completed");
}

#[tokio::test]
async fn test_client_cannot_complete() {
    let state = test_state();
    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state)
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/appointment/{id}/status?barberShopId=shop"))
                .header(header::AUTHORIZATION, format!("Bearer {}", token("client-a", Role::Client)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_find_by_client_scoped_to_owner() {
    let state = test_state();
    book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;

    let res = test_app(state.clone())
        .oneshot(get_request(
            "/appointment/client/client-a?barberShopId=shop",
            Some(&token("client-a", Role::Client)),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["serviceDetails"]["name"], "Cut");

    let res = test_app(state)
        .oneshot(get_request(
            "/appointment/client/client-a?barberShopId=shop",
            Some(&token("client-b", Role::Client)),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_remove_appointment() {
    let state = test_state();
    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T09:00:00Z")).await;
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/appointment/{id}?barberShopId=shop"))
                .header(header::AUTHORIZATION, format!("Bearer {}", token("admin", Role::Admin)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(get_request(
            &format!("/appointment/{id}?barberShopId=shop"),
            Some(&token("admin", Role::Admin)),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Calendar ──

#[tokio::test]
async fn test_calendar_download() {
    let state = test_state();
    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-07T10:30:00Z")).await;
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state)
        .oneshot(get_request(
            &format!("/appointment/{id}/calendar.ics?barberShopId=shop"),
            Some(&token("client-a", Role::Client)),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/calendar; charset=utf-8"
    );

    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("BEGIN:VCALENDAR"));
    assert!(text.contains("DTSTART:20300107T103000Z"));
    assert!(text.contains("SUMMARY:Cut at shop cuts"));
}

#[tokio::test]
async fn test_calendar_not_found() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request(
            "/appointment/missing/calendar.ics?barberShopId=shop",
            Some(&token("admin", Role::Admin)),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Units and holidays ──

#[tokio::test]
async fn test_public_unit_listing() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/unit?barberShopId=shop", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body[0]["id"], "unit");
}

#[tokio::test]
async fn test_client_cannot_create_holiday() {
    let app = test_app(test_state());
    let res = app
        .oneshot(json_request(
            "POST",
            "/holiday?barberShopId=shop",
            &token("client-a", Role::Client),
            serde_json::json!({ "name": "Day off", "date": "2030-02-01", "barbershop": "shop" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_creates_holiday() {
    let state = test_state();
    let res = test_app(state.clone())
        .oneshot(json_request(
            "POST",
            "/holiday?barberShopId=shop",
            &token("admin", Role::Admin),
            serde_json::json!({ "name": "Day off", "date": "2030-01-08", "barbershop": "shop" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = book(&state, "client-a", Role::Client, booking(Some("client-a"), None, "2030-01-08T09:00:00Z")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Record updates ──

#[tokio::test]
async fn test_client_updates_only_own_profile() {
    let state = test_state();
    let client = token("client-a", Role::Client);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "PATCH",
            "/auth/users/client-a?barberShopId=shop",
            &client,
            serde_json::json!({ "name": "Alice" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["name"], "Alice");

    let res = test_app(state)
        .oneshot(json_request(
            "PATCH",
            "/auth/users/client-b?barberShopId=shop",
            &client,
            serde_json::json!({ "name": "Mallory" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let state = test_state();
    let admin = token("admin", Role::Admin);

    let res = test_app(state.clone())
        .oneshot(json_request(
            "DELETE",
            "/auth/users/client-b?barberShopId=shop",
            &token("client-a", Role::Client),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(json_request("DELETE", "/auth/users/client-b?barberShopId=shop", &admin, serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(get_request("/auth/users/client-b?barberShopId=shop", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_developer_edits_barbershop() {
    let state = test_state();
    let body = serde_json::json!({ "name": "Renamed" });

    let res = test_app(state.clone())
        .oneshot(json_request("PATCH", "/barbershop/shop", &token("admin", Role::Admin), body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state)
        .oneshot(json_request("PATCH", "/barbershop/shop", &token("dev", Role::Developer), body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["name"], "Renamed");
}

#[tokio::test]
async fn test_admin_reprices_global_service() {
    let state = test_state();
    let res = test_app(state.clone())
        .oneshot(json_request(
            "PATCH",
            "/global-service/svc?barberShopId=shop",
            &token("admin", Role::Admin),
            serde_json::json!({ "price": 42.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["price"], 42.5);
    assert_eq!(body["name"], "Cut");
}
