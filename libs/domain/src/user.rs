//! Users and roles

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, required};

/// Role of a user; decides which dashboard and which operations are available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Worker => "worker",
        }
    }

    /// Whether users with this role appear on the work-hours roster
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Role::Manager | Role::Worker)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "worker" => Ok(Role::Worker),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A user as exposed to callers; the password hash never leaves the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub role: Role,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
}

impl NewUser {
    pub fn new(login: &str, password: &str, role: &str, full_name: &str) -> DomainResult<Self> {
        let login = required("Login", login)?;
        if password.trim().is_empty() {
            return Err(DomainError::validation("Password is required"));
        }
        let full_name = required("Full name", full_name)?;
        if role.trim().is_empty() {
            return Err(DomainError::validation("Role is required"));
        }
        let role = role.parse()?;

        Ok(Self {
            login,
            password: password.to_string(),
            role,
            full_name,
        })
    }
}
