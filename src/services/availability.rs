use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Unit;
use crate::services::calendar_rules::{calculate_available_slots, day_bounds, day_of_week_key, format_slot};

/// Free "HH:MM" slots for a unit on `date`.
pub fn get_available_timeslots(
    conn: &Connection,
    unit_id: &str,
    date: NaiveDate,
) -> Result<Vec<String>, AppError> {
    let unit = queries::get_unit(conn, unit_id)?.ok_or_else(|| AppError::not_found("Unit not found"))?;
    available_slots_for(conn, &unit, date)
}

/// Same as [`get_available_timeslots`] for a unit that is already loaded.
pub fn available_slots_for(
    conn: &Connection,
    unit: &Unit,
    date: NaiveDate,
) -> Result<Vec<String>, AppError> {
    let day = day_of_week_key(date);
    let (start, end) = unit
        .operating_hours
        .open_on(day)
        .and_then(|hours| hours.window())
        .ok_or_else(|| AppError::bad_request("The unit does not operate on the selected day."))?;

    let (day_start, day_end) = day_bounds(date);
    let taken: Vec<String> = queries::scheduled_times_in_range(conn, &unit.id, &day_start, &day_end)?
        .iter()
        .map(format_slot)
        .collect();

    let slots = calculate_available_slots(start, end, &taken);
    tracing::debug!(unit_id = %unit.id, %date, taken = taken.len(), free = slots.len(), "computed available slots");
    Ok(slots)
}
