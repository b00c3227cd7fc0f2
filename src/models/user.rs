use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Barber,
    Admin,
    Developer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Barber => "Barber",
            Role::Admin => "Admin",
            Role::Developer => "Developer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Client" => Some(Role::Client),
            "Barber" => Some(Role::Barber),
            "Admin" => Some(Role::Admin),
            "Developer" => Some(Role::Developer),
            _ => None,
        }
    }

    /// Admins and developers see every record of their barbershop.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Developer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub barbershop_id: String,
    #[serde(default)]
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub barbershop: String,
    pub units: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    pub units: Option<Vec<String>>,
}
