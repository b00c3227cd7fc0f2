use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Local,
    Global,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Local => "local",
            ServiceType::Global => "global",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(ServiceType::Local),
            "global" => Some(ServiceType::Global),
            _ => None,
        }
    }
}

/// Reference from an appointment to the service it books. The variant decides
/// which table the id lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRef {
    Local(String),
    Global(String),
}

impl ServiceRef {
    pub fn new(service_type: ServiceType, id: impl Into<String>) -> Self {
        match service_type {
            ServiceType::Local => ServiceRef::Local(id.into()),
            ServiceType::Global => ServiceRef::Global(id.into()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ServiceRef::Local(id) | ServiceRef::Global(id) => id,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceRef::Local(_) => ServiceType::Local,
            ServiceRef::Global(_) => ServiceType::Global,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalService {
    pub id: String,
    pub barbershop_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalService {
    pub id: String,
    pub barbershop_id: String,
    pub unit_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration_minutes: i64,
    pub barbers: Vec<String>,
}

/// Service fields shown alongside an appointment, whichever table they came from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration_minutes: i64,
    pub service_type: ServiceType,
}

impl From<GlobalService> for ServiceSummary {
    fn from(s: GlobalService) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            price: s.price,
            duration_minutes: s.duration_minutes,
            service_type: ServiceType::Global,
        }
    }
}

impl From<LocalService> for ServiceSummary {
    fn from(s: LocalService) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            price: s.price,
            duration_minutes: s.duration_minutes,
            service_type: ServiceType::Local,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGlobalServiceRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration: i64,
    pub barbershop: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub duration: i64,
    pub barbers: Vec<String>,
    pub barbershop: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGlobalServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocalServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i64>,
    pub barbers: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_ref_dispatch() {
        let local = ServiceRef::new(ServiceType::Local, "svc-1");
        assert_eq!(local, ServiceRef::Local("svc-1".to_string()));
        assert_eq!(local.service_type().as_str(), "local");

        let global = ServiceRef::new(ServiceType::Global, "svc-2");
        assert_eq!(global.id(), "svc-2");
        assert_eq!(global.service_type(), ServiceType::Global);
    }

    #[test]
    fn test_service_type_parse() {
        assert_eq!(ServiceType::parse("global"), Some(ServiceType::Global));
        assert_eq!(ServiceType::parse("Global"), None);
    }
}
