use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user record as held by the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Whether the account is enabled.
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub email_verification: bool,
    #[serde(default)]
    pub phone_verification: bool,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        if !self.name.is_empty() {
            writeln!(f, "Name: {}", self.name)?;
        }
        writeln!(f, "Email: {}", self.email)?;
        write!(f, "Phone: {}", self.phone)?;
        if let Some(created_at) = self.created_at {
            write!(f, "\nCreated: {}", created_at.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}

/// Input for creating a directory user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserParams {
    pub email: String,
    /// Phone number in E.164 form, e.g. `+15550100`.
    pub phone: String,
    pub name: Option<String>,
}

impl CreateUserParams {
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Checks the fields the directory requires.
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email cannot be empty".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("phone cannot be empty".to_string());
        }
        Ok(())
    }
}
