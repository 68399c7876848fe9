//! Agency clients.

use serde::{Deserialize, Serialize};

use super::primitives::string_enum;
use super::validate::{optional_text, required_text, ValidationError};

string_enum! {
    /// Relationship status of a client.
    ClientStatus ("client status", default = Active) {
        Lead => "lead",
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Create payload for a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewClient {
    /// Trim free-text fields and reject a blank name or a malformed email.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required_text("name", &self.name)?;
        self.company = optional_text(self.company);
        self.email = optional_text(self.email);
        self.phone = optional_text(self.phone);
        self.notes = optional_text(self.notes);

        if let Some(email) = &self.email {
            let well_formed = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !well_formed {
                return Err(ValidationError::Invalid {
                    field: "email",
                    reason: format!("{email:?} is not an email address"),
                });
            }
        }
        Ok(self)
    }
}
