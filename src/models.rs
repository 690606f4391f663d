use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Technician,
    User,
}

impl Role {
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Technician),
            3 => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_id(self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Technician => 2,
            Self::User => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub role_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub office_id: Option<i64>,
}

impl Identity {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: i64,
    #[serde(default)]
    pub office_id: Option<i64>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: i64,
    pub description: String,
    pub status_id: i64,
    #[serde(default)]
    pub reporter_id: Option<i64>,
    #[serde(default)]
    pub resolver_id: Option<i64>,
    pub office_id: i64,
    #[serde(default)]
    pub device_id: Option<i64>,
    pub opened_at: NaiveDateTime,
    #[serde(default)]
    pub resolved_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub office_id: i64,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub role_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentStatus {
    pub status_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    pub type_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentPayload {
    pub description: String,
    pub status_id: i64,
    pub reporter_id: i64,
    pub office_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i64>,
}
