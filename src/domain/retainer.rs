//! Retainers: recurring billing arrangements with a client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::primitives::string_enum;
use super::validate::{bounded_amount, optional_text, required_text, ValidationError};
use super::Decimal;

string_enum! {
    BillingCycle ("billing cycle", default = Monthly) {
        Monthly => "monthly",
        Quarterly => "quarterly",
        Annually => "annually",
    }
}

impl BillingCycle {
    /// Number of months covered by one billing period.
    pub fn months(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Annually => 12,
        }
    }
}

string_enum! {
    RetainerStatus ("retainer status", default = Active) {
        Active => "active",
        Paused => "paused",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retainer {
    pub id: String,
    pub client_id: Option<String>,
    pub name: String,
    /// Amount billed once per `billing_cycle`.
    pub amount: Decimal,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: RetainerStatus,
    pub created_at: String,
}

impl Retainer {
    /// Amount normalized to one month, rounded to cents.
    pub fn monthly_amount(&self) -> Decimal {
        (self.amount / Decimal::from_i64(self.billing_cycle.months())).round_cents()
    }

    /// Active on `date`: status is active and the date lies within the term.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.status == RetainerStatus::Active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRetainer {
    #[serde(default)]
    pub client_id: Option<String>,
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: RetainerStatus,
}

impl NewRetainer {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required_text("name", &self.name)?;
        self.amount = bounded_amount("amount", self.amount)?;
        self.client_id = optional_text(self.client_id);
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::Invalid {
                    field: "endDate",
                    reason: "must not be before startDate".to_string(),
                });
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn retainer(amount: &str, cycle: BillingCycle) -> Retainer {
        Retainer {
            id: "r-1".to_string(),
            client_id: None,
            name: "Social content".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            billing_cycle: cycle,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 30),
            status: RetainerStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_monthly_amount_per_cycle() {
        let d = |s| Decimal::from_str(s).unwrap();
        assert_eq!(retainer("4000", BillingCycle::Monthly).monthly_amount(), d("4000"));
        assert_eq!(retainer("9000", BillingCycle::Quarterly).monthly_amount(), d("3000"));
        assert_eq!(retainer("10000", BillingCycle::Annually).monthly_amount(), d("833.33"));
    }

    #[test]
    fn test_is_active_on_respects_term_and_status() {
        let mut r = retainer("4000", BillingCycle::Monthly);
        assert!(r.is_active_on(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()));
        assert!(r.is_active_on(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()));
        assert!(!r.is_active_on(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()));
        assert!(!r.is_active_on(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));

        r.status = RetainerStatus::Paused;
        assert!(!r.is_active_on(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()));
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let input: NewRetainer = serde_json::from_str(
            r#"{"name": "Ops", "amount": 100, "startDate": "2026-05-01", "endDate": "2026-04-01"}"#,
        )
        .unwrap();
        assert!(input.validate().is_err());
    }
}
