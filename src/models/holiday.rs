use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const HOLIDAY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub barbershop_id: String,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRequest {
    pub name: String,
    pub date: String,
    pub barbershop: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolidayRequest {
    pub name: Option<String>,
    pub date: Option<String>,
}
