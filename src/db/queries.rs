use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Address, Appointment, AppointmentStatus, Barbershop, Customer, GlobalService, Holiday,
    LocalService, OperatingHours, Role, ServiceRef, ServiceType, Unit, User, UserSummary,
    DATE_FORMAT, HOLIDAY_DATE_FORMAT,
};

/// True when `err` wraps a SQLite UNIQUE/CHECK violation.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── Barbershops ──

pub fn insert_barbershop(conn: &Connection, shop: &Barbershop) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO barbershops (id, name, description, phone_number, email) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![shop.id, shop.name, shop.description, shop.phone_number, shop.email],
    )?;
    Ok(())
}

pub fn get_barbershop(conn: &Connection, id: &str) -> anyhow::Result<Option<Barbershop>> {
    let shop = conn
        .query_row(
            "SELECT id, name, description, phone_number, email FROM barbershops WHERE id = ?1",
            params![id],
            parse_barbershop_row,
        )
        .optional()?;
    Ok(shop)
}

pub fn list_barbershops(conn: &Connection) -> anyhow::Result<Vec<Barbershop>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, phone_number, email FROM barbershops ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], parse_barbershop_row)?;

    let mut shops = vec![];
    for row in rows {
        shops.push(row?);
    }
    Ok(shops)
}

pub fn update_barbershop(conn: &Connection, shop: &Barbershop) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE barbershops SET name = ?1, description = ?2, phone_number = ?3, email = ?4 WHERE id = ?5",
        params![shop.name, shop.description, shop.phone_number, shop.email, shop.id],
    )?;
    Ok(count > 0)
}

/// Removes a barbershop; units, users, services, holidays and appointments go with it.
pub fn delete_barbershop(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM barbershops WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_barbershop_row(row: &rusqlite::Row) -> rusqlite::Result<Barbershop> {
    Ok(Barbershop {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        phone_number: row.get(3)?,
        email: row.get(4)?,
    })
}

// ── Units ──

const UNIT_COLUMNS: &str =
    "id, barbershop_id, address, phone_number, description, operating_hours";

pub fn insert_unit(conn: &Connection, unit: &Unit) -> anyhow::Result<()> {
    let address = serde_json::to_string(&unit.address)?;
    let hours = serde_json::to_string(&unit.operating_hours)?;

    conn.execute(
        "INSERT INTO units (id, barbershop_id, address, postal_code, phone_number, description, operating_hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            unit.id,
            unit.barbershop_id,
            address,
            unit.address.postal_code,
            unit.phone_number,
            unit.description,
            hours,
        ],
    )?;
    Ok(())
}

pub fn get_unit(conn: &Connection, id: &str) -> anyhow::Result<Option<Unit>> {
    let result = conn
        .query_row(
            &format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = ?1"),
            params![id],
            |row| Ok(parse_unit_row(row)),
        )
        .optional()?;

    result.transpose()
}

pub fn list_units(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<Unit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {UNIT_COLUMNS} FROM units WHERE barbershop_id = ?1 ORDER BY created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![barbershop_id], |row| Ok(parse_unit_row(row)))?;

    let mut units = vec![];
    for row in rows {
        units.push(row??);
    }
    Ok(units)
}

pub fn update_unit(conn: &Connection, unit: &Unit) -> anyhow::Result<bool> {
    let address = serde_json::to_string(&unit.address)?;
    let hours = serde_json::to_string(&unit.operating_hours)?;

    let count = conn.execute(
        "UPDATE units SET address = ?1, postal_code = ?2, phone_number = ?3, description = ?4, operating_hours = ?5
         WHERE id = ?6",
        params![
            address,
            unit.address.postal_code,
            unit.phone_number,
            unit.description,
            hours,
            unit.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_unit(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM units WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_unit_row(row: &rusqlite::Row) -> anyhow::Result<Unit> {
    let address_json: String = row.get(2)?;
    let hours_json: String = row.get(5)?;

    let address: Address =
        serde_json::from_str(&address_json).context("corrupt unit address")?;
    let operating_hours: OperatingHours =
        serde_json::from_str(&hours_json).context("corrupt unit operating hours")?;

    Ok(Unit {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        address,
        phone_number: row.get(3)?,
        description: row.get(4)?,
        operating_hours,
    })
}

// ── Users ──

/// Inserts a user and its unit links. Callers wrap this in a transaction
/// together with the access-list rebuild.
pub fn insert_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, phone_number, role, barbershop_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.name,
            user.email,
            user.phone_number,
            user.role.as_str(),
            user.barbershop_id,
        ],
    )?;

    for unit_id in &user.units {
        conn.execute(
            "INSERT INTO user_units (user_id, unit_id) VALUES (?1, ?2)",
            params![user.id, unit_id],
        )?;
    }
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn
        .query_row(
            "SELECT id, name, email, phone_number, role, barbershop_id FROM users WHERE id = ?1",
            params![id],
            |row| Ok(parse_user_row(row)),
        )
        .optional()?;

    match result {
        Some(user) => {
            let mut user = user?;
            user.units = list_user_units(conn, &user.id)?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub fn list_users(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone_number, role, barbershop_id FROM users
         WHERE barbershop_id = ?1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![barbershop_id], |row| Ok(parse_user_row(row)))?;

    let mut users = vec![];
    for row in rows {
        let mut user = row??;
        user.units = list_user_units(conn, &user.id)?;
        users.push(user);
    }
    Ok(users)
}

/// Rewrites a user's profile, role and unit links. Like `insert_user`, runs
/// inside the caller's transaction.
pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET name = ?1, email = ?2, phone_number = ?3, role = ?4 WHERE id = ?5",
        params![
            user.name,
            user.email,
            user.phone_number,
            user.role.as_str(),
            user.id,
        ],
    )?;
    if count == 0 {
        return Ok(false);
    }

    conn.execute("DELETE FROM user_units WHERE user_id = ?1", params![user.id])?;
    for unit_id in &user.units {
        conn.execute(
            "INSERT INTO user_units (user_id, unit_id) VALUES (?1, ?2)",
            params![user.id, unit_id],
        )?;
    }
    Ok(true)
}

pub fn delete_user(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_user_summary(conn: &Connection, id: &str) -> anyhow::Result<Option<UserSummary>> {
    let result = conn
        .query_row(
            "SELECT id, name, role FROM users WHERE id = ?1",
            params![id],
            |row| Ok(parse_user_summary_row(row)),
        )
        .optional()?;

    result.transpose()
}

fn list_user_units(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT unit_id FROM user_units WHERE user_id = ?1 ORDER BY unit_id ASC")?;
    let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;

    let mut units = vec![];
    for row in rows {
        units.push(row?);
    }
    Ok(units)
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(4)?;
    let role = Role::parse(&role_str).with_context(|| format!("unknown role: {role_str}"))?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone_number: row.get(3)?,
        role,
        barbershop_id: row.get(5)?,
        units: vec![],
    })
}

fn parse_user_summary_row(row: &rusqlite::Row) -> anyhow::Result<UserSummary> {
    let role_str: String = row.get(2)?;
    let role = Role::parse(&role_str).with_context(|| format!("unknown role: {role_str}"))?;

    Ok(UserSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        role,
    })
}

// ── Unit Access ──

/// Replaces the unit's access rows with every non-barber of its barbershop
/// plus the barbers linked to the unit. Returns the new row count. Runs
/// inside the caller's transaction.
pub fn replace_unit_access(
    conn: &Connection,
    unit_id: &str,
    barbershop_id: &str,
) -> anyhow::Result<usize> {
    conn.execute("DELETE FROM unit_access WHERE unit_id = ?1", params![unit_id])?;
    let count = conn.execute(
        "INSERT INTO unit_access (unit_id, user_id)
         SELECT ?1, u.id FROM users u
         WHERE u.barbershop_id = ?2
           AND (u.role != 'Barber'
                OR EXISTS (SELECT 1 FROM user_units uu WHERE uu.user_id = u.id AND uu.unit_id = ?1))",
        params![unit_id, barbershop_id],
    )?;
    Ok(count)
}

pub fn has_unit_access(conn: &Connection, unit_id: &str, user_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM unit_access WHERE unit_id = ?1 AND user_id = ?2",
        params![unit_id, user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_unit_access(conn: &Connection, unit_id: &str) -> anyhow::Result<Vec<UserSummary>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name, u.role FROM unit_access a JOIN users u ON u.id = a.user_id
         WHERE a.unit_id = ?1 ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map(params![unit_id], |row| Ok(parse_user_summary_row(row)))?;

    let mut users = vec![];
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

// ── Holidays ──

pub fn insert_holiday(conn: &Connection, holiday: &Holiday) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO holidays (id, barbershop_id, name, date) VALUES (?1, ?2, ?3, ?4)",
        params![
            holiday.id,
            holiday.barbershop_id,
            holiday.name,
            holiday.date.format(HOLIDAY_DATE_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_holiday(conn: &Connection, id: &str) -> anyhow::Result<Option<Holiday>> {
    let result = conn
        .query_row(
            "SELECT id, barbershop_id, name, date FROM holidays WHERE id = ?1",
            params![id],
            |row| Ok(parse_holiday_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// The holiday a barbershop has configured on `date`, if any.
pub fn find_holiday_on(
    conn: &Connection,
    barbershop_id: &str,
    date: NaiveDate,
) -> anyhow::Result<Option<Holiday>> {
    let result = conn
        .query_row(
            "SELECT id, barbershop_id, name, date FROM holidays WHERE barbershop_id = ?1 AND date = ?2",
            params![barbershop_id, date.format(HOLIDAY_DATE_FORMAT).to_string()],
            |row| Ok(parse_holiday_row(row)),
        )
        .optional()?;

    result.transpose()
}

pub fn list_holidays(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<Holiday>> {
    let mut stmt = conn.prepare(
        "SELECT id, barbershop_id, name, date FROM holidays WHERE barbershop_id = ?1 ORDER BY date ASC",
    )?;
    let rows = stmt.query_map(params![barbershop_id], |row| Ok(parse_holiday_row(row)))?;

    let mut holidays = vec![];
    for row in rows {
        holidays.push(row??);
    }
    Ok(holidays)
}

pub fn update_holiday(conn: &Connection, holiday: &Holiday) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE holidays SET name = ?1, date = ?2 WHERE id = ?3",
        params![
            holiday.name,
            holiday.date.format(HOLIDAY_DATE_FORMAT).to_string(),
            holiday.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_holiday(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM holidays WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_holiday_row(row: &rusqlite::Row) -> anyhow::Result<Holiday> {
    let date_str: String = row.get(3)?;
    let date = NaiveDate::parse_from_str(&date_str, HOLIDAY_DATE_FORMAT)
        .with_context(|| format!("corrupt holiday date: {date_str}"))?;

    Ok(Holiday {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        date,
    })
}

// ── Global Services ──

pub fn insert_global_service(conn: &Connection, service: &GlobalService) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO global_services (id, barbershop_id, name, description, price, duration_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            service.id,
            service.barbershop_id,
            service.name,
            service.description,
            service.price,
            service.duration_minutes,
        ],
    )?;
    Ok(())
}

pub fn get_global_service(conn: &Connection, id: &str) -> anyhow::Result<Option<GlobalService>> {
    let service = conn
        .query_row(
            "SELECT id, barbershop_id, name, description, price, duration_minutes
             FROM global_services WHERE id = ?1",
            params![id],
            parse_global_service_row,
        )
        .optional()?;
    Ok(service)
}

pub fn list_global_services(
    conn: &Connection,
    barbershop_id: &str,
) -> anyhow::Result<Vec<GlobalService>> {
    let mut stmt = conn.prepare(
        "SELECT id, barbershop_id, name, description, price, duration_minutes
         FROM global_services WHERE barbershop_id = ?1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![barbershop_id], parse_global_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn update_global_service(conn: &Connection, service: &GlobalService) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE global_services SET name = ?1, description = ?2, price = ?3, duration_minutes = ?4
         WHERE id = ?5",
        params![
            service.name,
            service.description,
            service.price,
            service.duration_minutes,
            service.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_global_service(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM global_services WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_global_service_row(row: &rusqlite::Row) -> rusqlite::Result<GlobalService> {
    Ok(GlobalService {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        duration_minutes: row.get(5)?,
    })
}

// ── Local Services ──

pub fn insert_local_service(conn: &Connection, service: &LocalService) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO local_services (id, barbershop_id, unit_id, name, description, price, duration_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            service.id,
            service.barbershop_id,
            service.unit_id,
            service.name,
            service.description,
            service.price,
            service.duration_minutes,
        ],
    )?;

    for barber_id in &service.barbers {
        tx.execute(
            "INSERT INTO local_service_barbers (service_id, barber_id) VALUES (?1, ?2)",
            params![service.id, barber_id],
        )?;
    }

    tx.commit()?;
    Ok(())
}

pub fn get_local_service(conn: &Connection, id: &str) -> anyhow::Result<Option<LocalService>> {
    let service = conn
        .query_row(
            "SELECT id, barbershop_id, unit_id, name, description, price, duration_minutes
             FROM local_services WHERE id = ?1",
            params![id],
            parse_local_service_row,
        )
        .optional()?;

    match service {
        Some(mut service) => {
            service.barbers = list_local_service_barbers(conn, &service.id)?;
            Ok(Some(service))
        }
        None => Ok(None),
    }
}

pub fn list_local_services(
    conn: &Connection,
    barbershop_id: &str,
    unit_id: &str,
) -> anyhow::Result<Vec<LocalService>> {
    let mut stmt = conn.prepare(
        "SELECT id, barbershop_id, unit_id, name, description, price, duration_minutes
         FROM local_services WHERE barbershop_id = ?1 AND unit_id = ?2 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![barbershop_id, unit_id], parse_local_service_row)?;

    let mut services = vec![];
    for row in rows {
        let mut service = row?;
        service.barbers = list_local_service_barbers(conn, &service.id)?;
        services.push(service);
    }
    Ok(services)
}

pub fn update_local_service(conn: &Connection, service: &LocalService) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;

    let count = tx.execute(
        "UPDATE local_services SET name = ?1, description = ?2, price = ?3, duration_minutes = ?4
         WHERE id = ?5",
        params![
            service.name,
            service.description,
            service.price,
            service.duration_minutes,
            service.id,
        ],
    )?;
    if count == 0 {
        return Ok(false);
    }

    tx.execute(
        "DELETE FROM local_service_barbers WHERE service_id = ?1",
        params![service.id],
    )?;
    for barber_id in &service.barbers {
        tx.execute(
            "INSERT INTO local_service_barbers (service_id, barber_id) VALUES (?1, ?2)",
            params![service.id, barber_id],
        )?;
    }

    tx.commit()?;
    Ok(true)
}

pub fn delete_local_service(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM local_services WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn list_local_service_barbers(conn: &Connection, service_id: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT barber_id FROM local_service_barbers WHERE service_id = ?1 ORDER BY barber_id ASC",
    )?;
    let rows = stmt.query_map(params![service_id], |row| row.get::<_, String>(0))?;

    let mut barbers = vec![];
    for row in rows {
        barbers.push(row?);
    }
    Ok(barbers)
}

fn parse_local_service_row(row: &rusqlite::Row) -> rusqlite::Result<LocalService> {
    Ok(LocalService {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        unit_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        price: row.get(5)?,
        duration_minutes: row.get(6)?,
        barbers: vec![],
    })
}

// ── Appointments ──

const APPOINTMENT_COLUMNS: &str = "id, barbershop_id, unit_id, barber_id, client_id, guest_name, \
     service_id, service_type, date, status, created_at, updated_at";

/// Which participant an appointment listing is keyed on.
#[derive(Debug, Clone, Copy)]
pub enum AppointmentFilter<'a> {
    Client(&'a str),
    Barber(&'a str),
    Unit(&'a str),
}

impl AppointmentFilter<'_> {
    fn column(&self) -> &'static str {
        match self {
            AppointmentFilter::Client(_) => "client_id",
            AppointmentFilter::Barber(_) => "barber_id",
            AppointmentFilter::Unit(_) => "unit_id",
        }
    }

    fn value(&self) -> &str {
        match self {
            AppointmentFilter::Client(v) | AppointmentFilter::Barber(v) | AppointmentFilter::Unit(v) => *v,
        }
    }
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, barbershop_id, unit_id, barber_id, client_id, guest_name,
                                   service_id, service_type, date, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            appt.id,
            appt.barbershop_id,
            appt.unit_id,
            appt.barber_id,
            appt.customer.client_id(),
            appt.customer.guest_name(),
            appt.service.id(),
            appt.service.service_type().as_str(),
            appt.date.format(DATE_FORMAT).to_string(),
            appt.status.as_str(),
            appt.created_at.format(DATE_FORMAT).to_string(),
            appt.updated_at.format(DATE_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            |row| Ok(parse_appointment_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// A non-cancelled appointment occupying exactly (barber, unit, date), other
/// than `exclude_id`.
pub fn find_appointment_at(
    conn: &Connection,
    barber_id: &str,
    unit_id: &str,
    date: &NaiveDateTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<Option<Appointment>> {
    let result = conn
        .query_row(
            &format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE barber_id = ?1 AND unit_id = ?2 AND date = ?3 AND status != 'cancelled'
                   AND (?4 IS NULL OR id != ?4)
                 LIMIT 1"
            ),
            params![barber_id, unit_id, date.format(DATE_FORMAT).to_string(), exclude_id],
            |row| Ok(parse_appointment_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// Start times of the unit's scheduled appointments in `[start, end)`.
pub fn scheduled_times_in_range(
    conn: &Connection,
    unit_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<NaiveDateTime>> {
    let mut stmt = conn.prepare(
        "SELECT date FROM appointments
         WHERE unit_id = ?1 AND status = 'scheduled' AND date >= ?2 AND date < ?3
         ORDER BY date ASC",
    )?;
    let rows = stmt.query_map(
        params![
            unit_id,
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string(),
        ],
        |row| row.get::<_, String>(0),
    )?;

    let mut times = vec![];
    for row in rows {
        let raw = row?;
        times.push(parse_stored_datetime(&raw)?);
    }
    Ok(times)
}

pub fn list_appointments(
    conn: &Connection,
    barbershop_id: &str,
    filter: AppointmentFilter<'_>,
) -> anyhow::Result<Vec<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE barbershop_id = ?1 AND {} = ?2 ORDER BY date ASC",
        filter.column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![barbershop_id, filter.value()], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment_schedule(
    conn: &Connection,
    id: &str,
    date: &NaiveDateTime,
    service: &ServiceRef,
    updated_at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET date = ?1, service_id = ?2, service_type = ?3, updated_at = ?4 WHERE id = ?5",
        params![
            date.format(DATE_FORMAT).to_string(),
            service.id(),
            service.service_type().as_str(),
            updated_at.format(DATE_FORMAT).to_string(),
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
    updated_at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), updated_at.format(DATE_FORMAT).to_string(), id],
    )?;
    Ok(count > 0)
}

pub fn delete_appointment(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_stored_datetime(raw: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("corrupt stored date: {raw}"))
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let client_id: Option<String> = row.get(4)?;
    let guest_name: Option<String> = row.get(5)?;
    let service_id: String = row.get(6)?;
    let service_type_str: String = row.get(7)?;
    let date_str: String = row.get(8)?;
    let status_str: String = row.get(9)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    let customer = match (client_id, guest_name) {
        (Some(id), _) => Customer::Registered(id),
        (None, Some(name)) => Customer::Guest(name),
        (None, None) => anyhow::bail!("appointment row has no customer"),
    };
    let service_type = ServiceType::parse(&service_type_str)
        .with_context(|| format!("unknown service type: {service_type_str}"))?;

    Ok(Appointment {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        unit_id: row.get(2)?,
        barber_id: row.get(3)?,
        customer,
        service: ServiceRef::new(service_type, service_id),
        date: parse_stored_datetime(&date_str)?,
        status: AppointmentStatus::parse(&status_str),
        created_at: parse_stored_datetime(&created_at_str)?,
        updated_at: parse_stored_datetime(&updated_at_str)?,
    })
}
