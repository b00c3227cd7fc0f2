use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::service::{ServiceRef, ServiceSummary, ServiceType};
use crate::models::user::UserSummary;

/// Storage format for appointment dates: UTC wall clock, lexically sortable.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Scheduled,
        }
    }
}

/// Who the appointment is for: a registered client or a walk-in guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Customer {
    Registered(String),
    Guest(String),
}

impl Customer {
    pub fn from_parts(client: Option<String>, guest_name: Option<String>) -> Result<Self, AppError> {
        let client = client.filter(|c| !c.trim().is_empty());
        let guest_name = guest_name.filter(|g| !g.trim().is_empty());

        match (client, guest_name) {
            (Some(id), None) => Ok(Customer::Registered(id)),
            (None, Some(name)) => Ok(Customer::Guest(name)),
            (Some(_), Some(_)) => Err(AppError::bad_request(
                "Provide either client or guestName, not both.",
            )),
            (None, None) => Err(AppError::bad_request("Either client or guestName is required.")),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Customer::Registered(id) => Some(id),
            Customer::Guest(_) => None,
        }
    }

    pub fn guest_name(&self) -> Option<&str> {
        match self {
            Customer::Registered(_) => None,
            Customer::Guest(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: String,
    pub barbershop_id: String,
    pub unit_id: String,
    pub barber_id: String,
    pub customer: Customer,
    pub service: ServiceRef,
    pub date: NaiveDateTime,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Wire shape of an appointment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub barbershop: String,
    pub unit: String,
    pub barber: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    pub service: String,
    pub service_type: ServiceType,
    pub date: String,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentView {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id.clone(),
            barbershop: a.barbershop_id.clone(),
            unit: a.unit_id.clone(),
            barber: a.barber_id.clone(),
            client: a.customer.client_id().map(str::to_string),
            guest_name: a.customer.guest_name().map(str::to_string),
            service: a.service.id().to_string(),
            service_type: a.service.service_type(),
            date: format!("{}Z", a.date.format(DATE_FORMAT)),
            status: a.status,
        }
    }
}

/// An appointment with its references resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: AppointmentView,
    pub service_details: Option<ServiceSummary>,
    pub barber_details: Option<UserSummary>,
    pub client_details: Option<UserSummary>,
    pub unit_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub client: Option<String>,
    pub guest_name: Option<String>,
    pub barber: String,
    pub service: String,
    pub service_type: ServiceType,
    pub barbershop: String,
    pub unit: String,
    pub date: String,
}
