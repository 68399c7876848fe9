//! Proposals sent to prospective or existing clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::primitives::string_enum;
use super::validate::{bounded_amount, optional_text, required_text, ValidationError};
use super::Decimal;

string_enum! {
    ProposalStatus ("proposal status", default = Draft) {
        Draft => "draft",
        Sent => "sent",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub client_id: Option<String>,
    pub title: String,
    pub amount: Decimal,
    pub status: ProposalStatus,
    pub valid_until: Option<NaiveDate>,
    pub summary: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    #[serde(default)]
    pub client_id: Option<String>,
    pub title: String,
    pub amount: Decimal,
    #[serde(default)]
    pub status: ProposalStatus,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl NewProposal {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = required_text("title", &self.title)?;
        self.amount = bounded_amount("amount", self.amount)?;
        self.client_id = optional_text(self.client_id);
        self.summary = optional_text(self.summary);
        Ok(self)
    }
}
