//! Income and expense ledger entries, plus CSV import of both.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validate::{bounded_amount, optional_text, required_text, ValidationError};
use super::Decimal;

/// Common view over income and expense rows used by the aggregations.
pub trait LedgerEntry {
    fn date(&self) -> NaiveDate;
    fn amount(&self) -> Decimal;
    fn category(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub client_id: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub vendor: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

impl LedgerEntry for Income {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl LedgerEntry for Expense {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn category(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewIncome {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.amount = bounded_amount("amount", self.amount)?;
        self.category = required_text("category", &self.category)?;
        self.client_id = optional_text(self.client_id);
        self.description = optional_text(self.description);
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewExpense {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.amount = bounded_amount("amount", self.amount)?;
        self.category = required_text("category", &self.category)?;
        self.vendor = optional_text(self.vendor);
        self.description = optional_text(self.description);
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("line {line}: {message}")]
    Row { line: u64, message: String },
    #[error("csv contains no rows")]
    Empty,
}

/// CSV columns: `date,amount,category,description`.
#[derive(Debug, Deserialize)]
struct IncomeCsvRow {
    date: NaiveDate,
    amount: Decimal,
    category: String,
    #[serde(default)]
    description: Option<String>,
}

/// CSV columns: `date,amount,category,vendor,description`.
#[derive(Debug, Deserialize)]
struct ExpenseCsvRow {
    date: NaiveDate,
    amount: Decimal,
    category: String,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Parse CSV text into rows of `R`, validating each converted row.
///
/// All-or-nothing: the first bad row aborts the import.
fn parse_rows<R, T>(
    csv_text: &str,
    convert: impl Fn(R) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ImportError>
where
    R: DeserializeOwned,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut out = Vec::new();
    for (index, row) in reader.deserialize::<R>().enumerate() {
        // header occupies line 1
        let line = index as u64 + 2;
        let row = row.map_err(|e| ImportError::Row {
            line,
            message: e.to_string(),
        })?;
        let item = convert(row).map_err(|e| ImportError::Row {
            line,
            message: e.to_string(),
        })?;
        out.push(item);
    }

    if out.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(out)
}

pub fn parse_income_csv(csv_text: &str) -> Result<Vec<NewIncome>, ImportError> {
    parse_rows(csv_text, |row: IncomeCsvRow| {
        NewIncome {
            date: row.date,
            amount: row.amount,
            category: row.category,
            client_id: None,
            description: row.description,
        }
        .validate()
    })
}

pub fn parse_expense_csv(csv_text: &str) -> Result<Vec<NewExpense>, ImportError> {
    parse_rows(csv_text, |row: ExpenseCsvRow| {
        NewExpense {
            date: row.date,
            amount: row.amount,
            category: row.category,
            vendor: row.vendor,
            description: row.description,
        }
        .validate()
    })
}
