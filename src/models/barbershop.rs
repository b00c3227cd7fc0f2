use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Barbershop {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub phone_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarbershopDetails {
    #[serde(flatten)]
    pub barbershop: Barbershop,
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarbershopRequest {
    pub name: String,
    pub description: Option<String>,
    pub phone_number: String,
    pub email: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBarbershopRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}
