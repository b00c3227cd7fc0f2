use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, ServiceRef, ServiceSummary, Unit, User};
use crate::services::calendar_rules::{
    day_of_week_key, format_slot, is_within_operating_window, validate_future_date,
};

/// Loads a unit. With `barbershop` set, a unit of another barbershop counts as missing.
pub fn validate_unit_exists(
    conn: &Connection,
    unit_id: &str,
    barbershop: Option<&str>,
) -> Result<Unit, AppError> {
    queries::get_unit(conn, unit_id)?
        .filter(|unit| barbershop.map_or(true, |shop| unit.barbershop_id == shop))
        .ok_or_else(|| AppError::not_found("Unit not found"))
}

pub fn validate_barber(conn: &Connection, barber_id: &str, barbershop: &str) -> Result<User, AppError> {
    queries::get_user(conn, barber_id)?
        .filter(|user| user.role == Role::Barber && user.barbershop_id == barbershop)
        .ok_or_else(|| AppError::not_found("Barber not found"))
}

pub fn validate_client(conn: &Connection, client_id: &str, barbershop: &str) -> Result<User, AppError> {
    queries::get_user(conn, client_id)?
        .filter(|user| user.role == Role::Client && user.barbershop_id == barbershop)
        .ok_or_else(|| AppError::not_found("Client not found"))
}

pub fn validate_service_existence(
    conn: &Connection,
    service: &ServiceRef,
    barbershop: &str,
) -> Result<ServiceSummary, AppError> {
    match service {
        ServiceRef::Local(id) => queries::get_local_service(conn, id)?
            .filter(|s| s.barbershop_id == barbershop)
            .map(ServiceSummary::from)
            .ok_or_else(|| AppError::not_found("Local service not found")),
        ServiceRef::Global(id) => queries::get_global_service(conn, id)?
            .filter(|s| s.barbershop_id == barbershop)
            .map(ServiceSummary::from)
            .ok_or_else(|| AppError::not_found("Global service not found")),
    }
}

/// Rejects a booking when another live appointment holds the exact same
/// barber, unit and start time.
pub fn validate_appointment_existence(
    conn: &Connection,
    barber_id: &str,
    unit_id: &str,
    date: &NaiveDateTime,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    if queries::find_appointment_at(conn, barber_id, unit_id, date, exclude_id)?.is_some() {
        return Err(AppError::conflict(
            "An appointment already exists for this time slot at this unit.",
        ));
    }
    Ok(())
}

pub fn validate_appointment_time(
    conn: &Connection,
    date: &NaiveDateTime,
    unit: &Unit,
    now: &NaiveDateTime,
) -> Result<(), AppError> {
    validate_future_date(date, now)?;

    if let Some(holiday) = queries::find_holiday_on(conn, &unit.barbershop_id, date.date())? {
        return Err(AppError::bad_request(format!(
            "The selected date is a holiday ({}), the barbershop will be closed that day.",
            holiday.name
        )));
    }

    let Some(hours) = unit.operating_hours.open_on(day_of_week_key(date.date())) else {
        let open = unit.operating_hours.to_human_readable();
        return Err(if open.is_empty() {
            AppError::bad_request("The unit does not operate on the selected day.")
        } else {
            AppError::bad_request(format!(
                "The unit does not operate on the selected day. Opening hours: {open}"
            ))
        });
    };

    if !is_within_operating_window(date.time(), hours) {
        return Err(AppError::bad_request(format!(
            "The appointment time must be between {} and {}.",
            hours.start.as_deref().unwrap_or_default(),
            hours.end.as_deref().unwrap_or_default()
        )));
    }

    Ok(())
}

pub fn check_appointment_is_available(slots: &[String], date: &NaiveDateTime) -> Result<(), AppError> {
    let time = format_slot(date);
    if !slots.contains(&time) {
        return Err(AppError::bad_request(format!(
            "The selected time ({time}) is not available."
        )));
    }
    Ok(())
}

/// Clients may only act for themselves, barbers only on their own chair.
pub fn validate_user_permission(
    role: Role,
    user_id: &str,
    client_id: Option<&str>,
    barber_id: &str,
) -> Result<(), AppError> {
    let allowed = match role {
        Role::Admin | Role::Developer => true,
        Role::Client => client_id == Some(user_id),
        Role::Barber => barber_id == user_id,
    };

    if !allowed {
        return Err(AppError::forbidden("Permission denied."));
    }
    Ok(())
}

/// Callers whose role is in `restricted` may only target their own id.
pub fn validate_permission(
    role: Role,
    user_id: &str,
    target_id: &str,
    restricted: &[Role],
) -> Result<(), AppError> {
    if restricted.contains(&role) && user_id != target_id {
        return Err(AppError::forbidden(
            "You do not have permission to access this resource",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{
        Address, Appointment, AppointmentStatus, Barbershop, Customer, DayHours, GlobalService,
        Holiday, OperatingHours,
    };
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn now() -> NaiveDateTime {
        dt("2029-12-01 08:00")
    }

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        for shop in ["shop", "other"] {
            queries::insert_barbershop(
                &conn,
                &Barbershop {
                    id: shop.into(),
                    name: shop.into(),
                    description: None,
                    phone_number: "555".into(),
                    email: format!("{shop}@example.com"),
                },
            )
            .unwrap();
        }
        queries::insert_unit(&conn, &unit()).unwrap();
        queries::insert_user(
            &conn,
            &User {
                id: "barber".into(),
                name: "Bob".into(),
                email: "bob@example.com".into(),
                phone_number: None,
                role: Role::Barber,
                barbershop_id: "shop".into(),
                units: vec!["unit".into()],
            },
        )
        .unwrap();
        queries::insert_user(
            &conn,
            &User {
                id: "client".into(),
                name: "Carla".into(),
                email: "carla@example.com".into(),
                phone_number: None,
                role: Role::Client,
                barbershop_id: "shop".into(),
                units: vec![],
            },
        )
        .unwrap();
        queries::insert_global_service(
            &conn,
            &GlobalService {
                id: "svc".into(),
                barbershop_id: "shop".into(),
                name: "Cut".into(),
                description: "Classic cut".into(),
                price: 30.0,
                duration_minutes: 45,
            },
        )
        .unwrap();
        conn
    }

    fn unit() -> Unit {
        Unit {
            id: "unit".into(),
            barbershop_id: "shop".into(),
            address: Address::default(),
            phone_number: "555".into(),
            description: String::new(),
            operating_hours: OperatingHours {
                monday: Some(DayHours::new("09:00", "12:00")),
                tuesday: Some(DayHours::new("09:00", "12:00")),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_unit_of_other_tenant_is_not_found() {
        let conn = setup_db();
        assert!(validate_unit_exists(&conn, "unit", Some("shop")).is_ok());
        assert!(validate_unit_exists(&conn, "unit", None).is_ok());
        assert!(matches!(
            validate_unit_exists(&conn, "unit", Some("other")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_barber_must_have_barber_role() {
        let conn = setup_db();
        assert!(validate_barber(&conn, "barber", "shop").is_ok());
        assert!(matches!(validate_barber(&conn, "client", "shop"), Err(AppError::NotFound(_))));
        assert!(matches!(validate_barber(&conn, "barber", "other"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_client_must_have_client_role() {
        let conn = setup_db();
        assert!(validate_client(&conn, "client", "shop").is_ok());
        assert!(matches!(validate_client(&conn, "barber", "shop"), Err(AppError::NotFound(_))));
        assert!(matches!(validate_client(&conn, "client", "other"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_service_lookup_dispatches_on_type() {
        let conn = setup_db();
        let summary =
            validate_service_existence(&conn, &ServiceRef::Global("svc".into()), "shop").unwrap();
        assert_eq!(summary.name, "Cut");

        let err = validate_service_existence(&conn, &ServiceRef::Local("svc".into()), "shop").unwrap_err();
        assert_eq!(err.to_string(), "Local service not found");
    }

    #[test]
    fn test_duplicate_triple_conflicts() {
        let conn = setup_db();
        let date = dt("2030-01-07 09:00");
        queries::insert_appointment(
            &conn,
            &Appointment {
                id: "a1".into(),
                barbershop_id: "shop".into(),
                unit_id: "unit".into(),
                barber_id: "barber".into(),
                customer: Customer::Registered("client".into()),
                service: ServiceRef::Global("svc".into()),
                date,
                status: AppointmentStatus::Scheduled,
                created_at: now(),
                updated_at: now(),
            },
        )
        .unwrap();

        assert!(matches!(
            validate_appointment_existence(&conn, "barber", "unit", &date, None),
            Err(AppError::Conflict(_))
        ));
        assert!(validate_appointment_existence(&conn, "barber", "unit", &date, Some("a1")).is_ok());
    }

    #[test]
    fn test_time_window_bounds() {
        let conn = setup_db();
        let unit = unit();
        assert!(validate_appointment_time(&conn, &dt("2030-01-07 09:00"), &unit, &now()).is_ok());
        assert!(matches!(
            validate_appointment_time(&conn, &dt("2030-01-07 12:00"), &unit, &now()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_closed_day_lists_opening_hours() {
        let conn = setup_db();
        let err = validate_appointment_time(&conn, &dt("2030-01-06 10:00"), &unit(), &now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The unit does not operate on the selected day. Opening hours: Monday: 09:00-12:00, Tuesday: 09:00-12:00"
        );
    }

    #[test]
    fn test_past_date_rejected_before_hours() {
        let conn = setup_db();
        let err = validate_appointment_time(&conn, &dt("2029-11-26 10:00"), &unit(), &now()).unwrap_err();
        assert_eq!(err.to_string(), "The appointment time must be in the future.");
    }

    #[test]
    fn test_holiday_named_in_error() {
        let conn = setup_db();
        queries::insert_holiday(
            &conn,
            &Holiday {
                id: "h1".into(),
                barbershop_id: "shop".into(),
                name: "Founders Day".into(),
                date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            },
        )
        .unwrap();

        let err = validate_appointment_time(&conn, &dt("2030-01-07 10:00"), &unit(), &now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("Founders Day"));
    }

    #[test]
    fn test_slot_availability() {
        let slots = vec!["09:00".to_string(), "09:45".to_string()];
        assert!(check_appointment_is_available(&slots, &dt("2030-01-07 09:45")).is_ok());
        let err = check_appointment_is_available(&slots, &dt("2030-01-07 10:30")).unwrap_err();
        assert_eq!(err.to_string(), "The selected time (10:30) is not available.");
    }

    #[test]
    fn test_user_permission() {
        assert!(validate_user_permission(Role::Admin, "x", Some("c"), "b").is_ok());
        assert!(validate_user_permission(Role::Client, "c", Some("c"), "b").is_ok());
        assert!(validate_user_permission(Role::Client, "c", Some("other"), "b").is_err());
        assert!(validate_user_permission(Role::Barber, "b", Some("c"), "b").is_ok());
        assert!(matches!(
            validate_user_permission(Role::Barber, "b", Some("c"), "other"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_restricted_permission() {
        let restricted = [Role::Client, Role::Barber];
        assert!(validate_permission(Role::Admin, "a", "c", &restricted).is_ok());
        assert!(validate_permission(Role::Client, "c", "c", &restricted).is_ok());
        assert!(matches!(
            validate_permission(Role::Client, "c", "other", &restricted),
            Err(AppError::Forbidden(_))
        ));
    }
}
