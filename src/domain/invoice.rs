//! Invoices and their read-time totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::primitives::string_enum;
use super::validate::{
    bounded_amount, optional_text, positive_quantity, required_text, ValidationError,
};
use super::Decimal;

string_enum! {
    InvoiceStatus ("invoice status", default = Draft) {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

impl InvoiceStatus {
    /// Issued to the client and not yet settled.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

fn one() -> Decimal {
    Decimal::from_i64(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default = "one")]
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub client_id: Option<String>,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub line_items: Vec<LineItem>,
    /// Tax percentage applied to the subtotal.
    pub tax_rate: Decimal,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Amounts derived from an invoice's line items and tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal: Decimal = self.line_items.iter().map(LineItem::amount).sum();
        let tax = self.tax_rate.percent_of(subtotal).round_cents();
        InvoiceTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[serde(default)]
    pub client_id: Option<String>,
    pub number: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewInvoice {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.number = required_text("number", &self.number)?;
        self.client_id = optional_text(self.client_id);
        self.notes = optional_text(self.notes);

        let mut subtotal = Decimal::zero();
        for item in &mut self.line_items {
            item.description = required_text("lineItems.description", &item.description)?;
            positive_quantity("lineItems.quantity", item.quantity)?;
            bounded_amount("lineItems.unitPrice", item.unit_price)?;
            subtotal = item
                .quantity
                .checked_mul(item.unit_price)
                .and_then(|amount| subtotal.checked_add(amount))
                .map_err(|e| ValidationError::Invalid {
                    field: "lineItems",
                    reason: e.to_string(),
                })?;
        }
        bounded_amount("lineItems", subtotal).map_err(|_| ValidationError::Invalid {
            field: "lineItems",
            reason: format!("subtotal must not exceed {}", Decimal::max_amount()),
        })?;

        bounded_amount("taxRate", self.tax_rate)?;
        if self.tax_rate > Decimal::from_i64(100) {
            return Err(ValidationError::Invalid {
                field: "taxRate",
                reason: "must be between 0 and 100".to_string(),
            });
        }

        if let Some(due) = self.due_date {
            if due < self.issue_date {
                return Err(ValidationError::Invalid {
                    field: "dueDate",
                    reason: "must not be before issueDate".to_string(),
                });
            }
        }
        Ok(self)
    }
}
