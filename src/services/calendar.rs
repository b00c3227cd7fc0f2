use chrono::Duration;

use crate::models::Appointment;

/// Event fields that come from records the appointment references.
pub struct EventInfo<'a> {
    pub barbershop_name: &'a str,
    pub service_name: &'a str,
    pub duration_minutes: i64,
    pub location: Option<&'a str>,
}

pub fn generate_ics(appointment: &Appointment, info: &EventInfo<'_>) -> String {
    let dtstart = appointment.date.format("%Y%m%dT%H%M%SZ").to_string();
    let dtend = (appointment.date + Duration::minutes(info.duration_minutes))
        .format("%Y%m%dT%H%M%SZ")
        .to_string();
    let dtstamp = appointment.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@barbershop", appointment.id);

    let summary = escape_text(&format!("{} at {}", info.service_name, info.barbershop_name));
    let location = match info.location {
        Some(location) => format!("LOCATION:{}\r\n", escape_text(location)),
        None => String::new(),
    };
    let status = appointment.status.as_str().to_uppercase();

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Barbershop//Appointments//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         {location}\
         DESCRIPTION:Appointment status: {status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
