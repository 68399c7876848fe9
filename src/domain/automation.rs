//! Automations and the credentials they reference.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::validate::{optional_text, required_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Free-form trigger description, e.g. `invoice.paid` or `cron:0 9 * * 1`.
    pub trigger: String,
    pub enabled: bool,
    pub workflow_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAutomation {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub workflow_id: Option<String>,
}

impl NewAutomation {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required_text("name", &self.name)?;
        self.trigger = required_text("trigger", &self.trigger)?;
        self.description = optional_text(self.description);
        self.workflow_id = optional_text(self.workflow_id);
        Ok(self)
    }
}

/// A stored third-party credential. `secret` never leaves the process;
/// use [`Credential::redacted`] for anything returned to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub secret: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedCredential {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub fingerprint: String,
    pub hint: String,
    pub created_at: String,
}

impl Credential {
    /// First 8 bytes of SHA-256 over the secret, hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.secret.as_bytes());
        hex::encode(&digest[..8])
    }

    /// Masked tail of the secret.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.secret.chars().collect();
        if chars.len() <= 4 {
            return "••••".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("••••{tail}")
    }

    pub fn redacted(&self) -> RedactedCredential {
        RedactedCredential {
            id: self.id.clone(),
            name: self.name.clone(),
            provider: self.provider.clone(),
            fingerprint: self.fingerprint(),
            hint: self.hint(),
            created_at: self.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub name: String,
    pub provider: String,
    pub secret: String,
}

impl NewCredential {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required_text("name", &self.name)?;
        self.provider = required_text("provider", &self.provider)?;
        // secrets are stored verbatim, only emptiness is checked
        if self.secret.trim().is_empty() {
            return Err(ValidationError::Missing("secret"));
        }
        Ok(self)
    }
}
