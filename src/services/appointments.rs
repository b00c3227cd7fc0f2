use chrono::Utc;
use rusqlite::Connection;

use crate::auth::RequestContext;
use crate::db::queries::{self, AppointmentFilter};
use crate::errors::AppError;
use crate::models::{
    Appointment, AppointmentDetails, AppointmentRequest, AppointmentStatus, AppointmentView,
    Customer, Role, ServiceRef, ServiceSummary,
};
use crate::services::availability::available_slots_for;
use crate::services::calendar::{generate_ics, EventInfo};
use crate::services::calendar_rules::{parse_appointment_date, SLOT_MINUTES};
use crate::services::roster::write_with_access;
use crate::services::validation::{
    check_appointment_is_available, validate_appointment_existence, validate_appointment_time,
    validate_barber, validate_client, validate_permission, validate_service_existence,
    validate_unit_exists, validate_user_permission,
};

const SELF_SERVICE_ROLES: [Role; 2] = [Role::Client, Role::Barber];

pub fn create(
    conn: &Connection,
    ctx: &RequestContext,
    req: AppointmentRequest,
) -> Result<AppointmentView, AppError> {
    let customer = Customer::from_parts(req.client, req.guest_name)?;
    ensure_same_tenant(ctx, &req.barbershop)?;

    if let Customer::Registered(client_id) = &customer {
        validate_user_permission(ctx.role, &ctx.user_id, Some(client_id), &req.barber)?;
    }

    let date = parse_appointment_date(&req.date)?;
    let now = Utc::now().naive_utc();

    let unit = validate_unit_exists(conn, &req.unit, Some(&ctx.barbershop))?;
    validate_barber(conn, &req.barber, &ctx.barbershop)?;
    if let Customer::Registered(client_id) = &customer {
        validate_client(conn, client_id, &ctx.barbershop)?;
    }
    validate_appointment_time(conn, &date, &unit, &now)?;

    let service = ServiceRef::new(req.service_type, req.service);
    validate_service_existence(conn, &service, &ctx.barbershop)?;
    validate_appointment_existence(conn, &req.barber, &unit.id, &date, None)?;

    let slots = available_slots_for(conn, &unit, date.date())?;
    check_appointment_is_available(&slots, &date)?;

    let appointment = Appointment {
        id: uuid::Uuid::new_v4().to_string(),
        barbershop_id: ctx.barbershop.clone(),
        unit_id: unit.id.clone(),
        barber_id: req.barber,
        customer,
        service,
        date,
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };

    write_with_access(conn, &unit.id, &unit.barbershop_id, |tx| {
        queries::insert_appointment(tx, &appointment).map_err(slot_taken_or_internal)
    })?;

    tracing::info!(
        appointment_id = %appointment.id,
        unit_id = %appointment.unit_id,
        barber_id = %appointment.barber_id,
        date = %appointment.date,
        "appointment created"
    );
    Ok(AppointmentView::from(&appointment))
}

/// Moves an appointment to a new date (and possibly a new service). Barber,
/// unit and customer in the request must match the stored appointment.
pub fn update(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
    req: AppointmentRequest,
) -> Result<AppointmentView, AppError> {
    let customer = Customer::from_parts(req.client, req.guest_name)?;
    ensure_same_tenant(ctx, &req.barbershop)?;

    // A guest booking has no client id, so only staff can move it.
    validate_user_permission(ctx.role, &ctx.user_id, customer.client_id(), &req.barber)?;

    let mut appointment = queries::get_appointment(conn, id)?
        .filter(|a| {
            a.barbershop_id == ctx.barbershop
                && a.barber_id == req.barber
                && a.unit_id == req.unit
                && a.customer == customer
        })
        .ok_or_else(|| AppError::not_found("Appointment not found"))?;

    if appointment.status != AppointmentStatus::Scheduled {
        return Err(AppError::bad_request(
            "Only scheduled appointments can be rescheduled.",
        ));
    }

    let date = parse_appointment_date(&req.date)?;
    if appointment.date == date {
        return Err(AppError::conflict(
            "An appointment already exists for this time slot at this unit.",
        ));
    }

    validate_barber(conn, &req.barber, &ctx.barbershop)?;
    validate_appointment_existence(conn, &req.barber, &req.unit, &date, Some(id))?;

    let now = Utc::now().naive_utc();
    let unit = validate_unit_exists(conn, &req.unit, Some(&ctx.barbershop))?;
    validate_appointment_time(conn, &date, &unit, &now)?;

    let service = ServiceRef::new(req.service_type, req.service);
    validate_service_existence(conn, &service, &ctx.barbershop)?;

    let slots = available_slots_for(conn, &unit, date.date())?;
    check_appointment_is_available(&slots, &date)?;

    write_with_access(conn, &unit.id, &unit.barbershop_id, |tx| {
        let updated = queries::update_appointment_schedule(tx, id, &date, &service, &now)
            .map_err(slot_taken_or_internal)?;
        if !updated {
            return Err(AppError::Internal(anyhow::anyhow!(
                "appointment {id} vanished during update"
            )));
        }
        Ok(())
    })?;

    tracing::info!(appointment_id = %id, from = %appointment.date, to = %date, "appointment rescheduled");

    appointment.date = date;
    appointment.service = service;
    appointment.updated_at = now;
    Ok(AppointmentView::from(&appointment))
}

pub fn change_status(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
) -> Result<AppointmentView, AppError> {
    let mut appointment = load_in_tenant(conn, ctx, id)?;

    if appointment.status != AppointmentStatus::Scheduled {
        return Err(AppError::bad_request(
            "The status of this appointment cannot be changed.",
        ));
    }

    let now = Utc::now().naive_utc();
    queries::update_appointment_status(conn, id, AppointmentStatus::Completed, &now)?;
    tracing::info!(appointment_id = %id, "appointment completed");

    appointment.status = AppointmentStatus::Completed;
    appointment.updated_at = now;
    Ok(AppointmentView::from(&appointment))
}

pub fn find_one(
    conn: &Connection,
    ctx: &RequestContext,
    id: &str,
) -> Result<AppointmentDetails, AppError> {
    let appointment = load_owned(conn, ctx, id)?;
    resolve_details(conn, &appointment)
}

/// Appointments of a user, as barber when the user is a barber and as client otherwise.
pub fn find_all_by_user(
    conn: &Connection,
    ctx: &RequestContext,
    user_id: &str,
) -> Result<Vec<AppointmentDetails>, AppError> {
    validate_permission(ctx.role, &ctx.user_id, user_id, &SELF_SERVICE_ROLES)?;

    let user = queries::get_user(conn, user_id)?
        .filter(|u| u.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let filter = match user.role {
        Role::Barber => AppointmentFilter::Barber(user_id),
        _ => AppointmentFilter::Client(user_id),
    };
    list_resolved(conn, ctx, filter, "No appointments found for this user")
}

pub fn find_all_by_client(
    conn: &Connection,
    ctx: &RequestContext,
    client_id: &str,
) -> Result<Vec<AppointmentDetails>, AppError> {
    validate_permission(ctx.role, &ctx.user_id, client_id, &SELF_SERVICE_ROLES)?;
    list_resolved(
        conn,
        ctx,
        AppointmentFilter::Client(client_id),
        "No appointments found for this client",
    )
}

pub fn find_all_by_barber(
    conn: &Connection,
    ctx: &RequestContext,
    barber_id: &str,
) -> Result<Vec<AppointmentDetails>, AppError> {
    validate_permission(ctx.role, &ctx.user_id, barber_id, &SELF_SERVICE_ROLES)?;
    list_resolved(
        conn,
        ctx,
        AppointmentFilter::Barber(barber_id),
        "No appointments found for this barber",
    )
}

/// Staff see every unit of their barbershop; barbers only units they have access to.
pub fn find_all_by_unit(
    conn: &Connection,
    ctx: &RequestContext,
    unit_id: &str,
) -> Result<Vec<AppointmentDetails>, AppError> {
    let unit = validate_unit_exists(conn, unit_id, Some(&ctx.barbershop))?;

    let allowed = match ctx.role {
        Role::Admin | Role::Developer => true,
        Role::Barber => queries::has_unit_access(conn, &unit.id, &ctx.user_id)?,
        Role::Client => false,
    };
    if !allowed {
        return Err(AppError::forbidden(
            "You do not have permission to access this resource",
        ));
    }

    list_resolved(
        conn,
        ctx,
        AppointmentFilter::Unit(&unit.id),
        "No appointments found for this unit",
    )
}

pub fn remove(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<(), AppError> {
    let appointment = load_owned(conn, ctx, id)?;
    queries::delete_appointment(conn, &appointment.id)?;
    tracing::info!(appointment_id = %id, user_id = %ctx.user_id, "appointment deleted");
    Ok(())
}

/// Single-event iCalendar document for an appointment the caller may read.
pub fn calendar_export(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<String, AppError> {
    let appointment = load_owned(conn, ctx, id)?;

    let service = resolve_service(conn, &appointment.service)?;
    let shop = queries::get_barbershop(conn, &appointment.barbershop_id)?
        .ok_or_else(|| AppError::not_found("Barbershop not found"))?;
    let location = queries::get_unit(conn, &appointment.unit_id)?.map(|u| u.address.one_line());

    let info = EventInfo {
        barbershop_name: &shop.name,
        service_name: service.as_ref().map_or("Appointment", |s| s.name.as_str()),
        duration_minutes: service
            .as_ref()
            .map_or(i64::from(SLOT_MINUTES), |s| s.duration_minutes),
        location: location.as_deref(),
    };
    Ok(generate_ics(&appointment, &info))
}

fn ensure_same_tenant(ctx: &RequestContext, barbershop: &str) -> Result<(), AppError> {
    if barbershop != ctx.barbershop {
        return Err(AppError::forbidden("You do not have access to this barbershop."));
    }
    Ok(())
}

fn load_in_tenant(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<Appointment, AppError> {
    queries::get_appointment(conn, id)?
        .filter(|a| a.barbershop_id == ctx.barbershop)
        .ok_or_else(|| AppError::not_found(format!("Appointment with ID {id} not found")))
}

/// Loads an appointment the caller owns: staff own everything in their
/// barbershop, clients their bookings, barbers their chair.
fn load_owned(conn: &Connection, ctx: &RequestContext, id: &str) -> Result<Appointment, AppError> {
    let appointment = load_in_tenant(conn, ctx, id)?;

    let owns = match ctx.role {
        Role::Admin | Role::Developer => true,
        Role::Client => appointment.customer.client_id() == Some(ctx.user_id.as_str()),
        Role::Barber => appointment.barber_id == ctx.user_id,
    };
    if !owns {
        return Err(AppError::forbidden(
            "You do not have permission to access this appointment.",
        ));
    }
    Ok(appointment)
}

fn list_resolved(
    conn: &Connection,
    ctx: &RequestContext,
    filter: AppointmentFilter<'_>,
    empty_message: &str,
) -> Result<Vec<AppointmentDetails>, AppError> {
    let appointments = queries::list_appointments(conn, &ctx.barbershop, filter)?;
    if appointments.is_empty() {
        return Err(AppError::not_found(empty_message));
    }

    appointments
        .iter()
        .map(|a| resolve_details(conn, a))
        .collect()
}

fn resolve_service(conn: &Connection, service: &ServiceRef) -> Result<Option<ServiceSummary>, AppError> {
    let summary = match service {
        ServiceRef::Local(id) => queries::get_local_service(conn, id)?.map(ServiceSummary::from),
        ServiceRef::Global(id) => queries::get_global_service(conn, id)?.map(ServiceSummary::from),
    };
    Ok(summary)
}

fn resolve_details(conn: &Connection, appointment: &Appointment) -> Result<AppointmentDetails, AppError> {
    let client_details = match appointment.customer.client_id() {
        Some(client_id) => queries::get_user_summary(conn, client_id)?,
        None => None,
    };

    Ok(AppointmentDetails {
        appointment: AppointmentView::from(appointment),
        service_details: resolve_service(conn, &appointment.service)?,
        barber_details: queries::get_user_summary(conn, &appointment.barber_id)?,
        client_details,
        unit_address: queries::get_unit(conn, &appointment.unit_id)?.map(|u| u.address.one_line()),
    })
}

fn slot_taken_or_internal(err: anyhow::Error) -> AppError {
    if queries::is_constraint_violation(&err) {
        AppError::conflict("An appointment already exists for this time slot at this unit.")
    } else {
        AppError::Internal(err)
    }
}
