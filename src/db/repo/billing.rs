//! Invoice, proposal, and retainer operations for the repository.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{date_text, get_date, get_decimal, get_json, get_opt_date, get_parsed, Repository};
use crate::domain::primitives::{new_id, now_rfc3339};
use crate::domain::decimal::text;
use crate::domain::{
    Decimal, Invoice, InvoiceStatus, LineItem, NewInvoice, NewProposal, NewRetainer, Proposal,
    Retainer,
};

/// Persisted shape of a line item. Amounts are written as JSON strings so
/// the `line_items` column keeps every digit.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    description: String,
    #[serde(with = "text")]
    quantity: Decimal,
    #[serde(with = "text")]
    unit_price: Decimal,
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        StoredLineItem {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<StoredLineItem> for LineItem {
    fn from(item: StoredLineItem) -> Self {
        LineItem {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

fn line_items_json(items: &[LineItem]) -> Result<String, sqlx::Error> {
    let stored: Vec<StoredLineItem> = items.iter().map(StoredLineItem::from).collect();
    serde_json::to_string(&stored).map_err(|e| sqlx::Error::Protocol(e.to_string()))
}

fn get_line_items(row: &SqliteRow) -> Result<Vec<LineItem>, sqlx::Error> {
    let stored: Vec<StoredLineItem> = get_json(row, "line_items")?;
    Ok(stored.into_iter().map(LineItem::from).collect())
}

fn invoice_from_row(row: &SqliteRow) -> Result<Invoice, sqlx::Error> {
    Ok(Invoice {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        number: row.try_get("number")?,
        issue_date: get_date(row, "issue_date")?,
        due_date: get_opt_date(row, "due_date")?,
        status: get_parsed(row, "status")?,
        line_items: get_line_items(row)?,
        tax_rate: get_decimal(row, "tax_rate")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn proposal_from_row(row: &SqliteRow) -> Result<Proposal, sqlx::Error> {
    Ok(Proposal {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        title: row.try_get("title")?,
        amount: get_decimal(row, "amount")?,
        status: get_parsed(row, "status")?,
        valid_until: get_opt_date(row, "valid_until")?,
        summary: row.try_get("summary")?,
        created_at: row.try_get("created_at")?,
    })
}

fn retainer_from_row(row: &SqliteRow) -> Result<Retainer, sqlx::Error> {
    Ok(Retainer {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        name: row.try_get("name")?,
        amount: get_decimal(row, "amount")?,
        billing_cycle: get_parsed(row, "billing_cycle")?,
        start_date: get_date(row, "start_date")?,
        end_date: get_opt_date(row, "end_date")?,
        status: get_parsed(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

const INVOICE_COLUMNS: &str =
    "id, client_id, number, issue_date, due_date, status, line_items, tax_rate, notes, created_at";

pub(crate) async fn insert_invoice_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewInvoice,
) -> Result<Invoice, sqlx::Error> {
    let invoice = Invoice {
        id: new_id(),
        client_id: input.client_id,
        number: input.number,
        issue_date: input.issue_date,
        due_date: input.due_date,
        status: input.status,
        line_items: input.line_items,
        tax_rate: input.tax_rate,
        notes: input.notes,
        created_at: now_rfc3339(),
    };
    let line_items = line_items_json(&invoice.line_items)?;

    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, client_id, number, issue_date, due_date, status,
            line_items, tax_rate, notes, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invoice.id.as_str())
    .bind(invoice.client_id.as_deref())
    .bind(invoice.number.as_str())
    .bind(date_text(invoice.issue_date))
    .bind(invoice.due_date.map(date_text))
    .bind(invoice.status.as_str())
    .bind(line_items)
    .bind(invoice.tax_rate.to_canonical_string())
    .bind(invoice.notes.as_deref())
    .bind(invoice.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(invoice)
}

pub(crate) async fn insert_proposal_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewProposal,
) -> Result<Proposal, sqlx::Error> {
    let proposal = Proposal {
        id: new_id(),
        client_id: input.client_id,
        title: input.title,
        amount: input.amount,
        status: input.status,
        valid_until: input.valid_until,
        summary: input.summary,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO proposals (id, client_id, title, amount, status, valid_until, summary, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(proposal.id.as_str())
    .bind(proposal.client_id.as_deref())
    .bind(proposal.title.as_str())
    .bind(proposal.amount.to_canonical_string())
    .bind(proposal.status.as_str())
    .bind(proposal.valid_until.map(date_text))
    .bind(proposal.summary.as_deref())
    .bind(proposal.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(proposal)
}

pub(crate) async fn insert_retainer_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewRetainer,
) -> Result<Retainer, sqlx::Error> {
    let retainer = Retainer {
        id: new_id(),
        client_id: input.client_id,
        name: input.name,
        amount: input.amount,
        billing_cycle: input.billing_cycle,
        start_date: input.start_date,
        end_date: input.end_date,
        status: input.status,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO retainers (
            id, client_id, name, amount, billing_cycle, start_date, end_date, status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(retainer.id.as_str())
    .bind(retainer.client_id.as_deref())
    .bind(retainer.name.as_str())
    .bind(retainer.amount.to_canonical_string())
    .bind(retainer.billing_cycle.as_str())
    .bind(date_text(retainer.start_date))
    .bind(retainer.end_date.map(date_text))
    .bind(retainer.status.as_str())
    .bind(retainer.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(retainer)
}

impl Repository {
    // =========================================================================
    // Invoices
    // =========================================================================

    /// Insert an invoice. Totals are not stored; see [`Invoice::totals`].
    ///
    /// # Errors
    /// Returns an error if the insert fails, including a duplicate invoice
    /// number or an unknown `client_id`.
    pub async fn insert_invoice(&self, input: NewInvoice) -> Result<Invoice, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let invoice = insert_invoice_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(invoice)
    }

    /// List invoices, most recently issued first, optionally by status.
    pub async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices WHERE status = ? \
                     ORDER BY issue_date DESC, number DESC"
                );
                sqlx::query(&sql)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY issue_date DESC, number DESC"
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(invoice_from_row).collect()
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, sqlx::Error> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(invoice_from_row).transpose()
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    pub async fn insert_proposal(&self, input: NewProposal) -> Result<Proposal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let proposal = insert_proposal_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(proposal)
    }

    pub async fn list_proposals(&self) -> Result<Vec<Proposal>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, title, amount, status, valid_until, summary, created_at
            FROM proposals
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(proposal_from_row).collect()
    }

    // =========================================================================
    // Retainers
    // =========================================================================

    pub async fn insert_retainer(&self, input: NewRetainer) -> Result<Retainer, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let retainer = insert_retainer_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(retainer)
    }

    pub async fn list_retainers(&self) -> Result<Vec<Retainer>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, name, amount, billing_cycle, start_date, end_date, status, created_at
            FROM retainers
            ORDER BY start_date DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(retainer_from_row).collect()
    }
}
