use serde::{Deserialize, Serialize};

use crate::models::operating_hours::OperatingHours;
use crate::models::user::UserSummary;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_address: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Address {
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.full_address, self.city, self.state, self.postal_code, self.country
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub barbershop_id: String,
    pub address: Address,
    pub phone_number: String,
    pub description: String,
    pub operating_hours: OperatingHours,
}

/// A unit together with the barbers allowed to see its bookings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetails {
    #[serde(flatten)]
    pub unit: Unit,
    pub barbers: Vec<UserSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRequest {
    pub address: Address,
    pub phone_number: String,
    #[serde(default)]
    pub description: String,
    pub operating_hours: OperatingHours,
    pub barbershop: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_one_line() {
        let address = Address {
            full_address: "Rua A, 100".to_string(),
            postal_code: "01000-000".to_string(),
            city: "Sao Paulo".to_string(),
            state: "SP".to_string(),
            country: "Brazil".to_string(),
        };
        assert_eq!(address.one_line(), "Rua A, 100, Sao Paulo, SP 01000-000, Brazil");
    }
}
