use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::{or_empty, AppState};
use crate::domain::{
    Decimal, Invoice, InvoiceStatus, InvoiceTotals, LineItem, NewInvoice, NewProposal,
    NewRetainer, Proposal, Retainer,
};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDto {
    #[serde(flatten)]
    pub item: LineItem,
    pub amount: Decimal,
}

/// Invoice as served: stored fields, per-line amounts and derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    pub id: String,
    pub client_id: Option<String>,
    pub number: String,
    pub issue_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: InvoiceStatus,
    pub line_items: Vec<LineItemDto>,
    pub tax_rate: Decimal,
    pub notes: Option<String>,
    pub created_at: String,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
}

impl From<Invoice> for InvoiceDto {
    fn from(invoice: Invoice) -> Self {
        let totals = invoice.totals();
        let line_items = invoice
            .line_items
            .into_iter()
            .map(|item| LineItemDto {
                amount: item.amount(),
                item,
            })
            .collect();

        InvoiceDto {
            id: invoice.id,
            client_id: invoice.client_id,
            number: invoice.number,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            status: invoice.status,
            line_items,
            tax_rate: invoice.tax_rate,
            notes: invoice.notes,
            created_at: invoice.created_at,
            totals,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainerDto {
    #[serde(flatten)]
    pub retainer: Retainer,
    pub monthly_amount: Decimal,
}

impl From<Retainer> for RetainerDto {
    fn from(retainer: Retainer) -> Self {
        RetainerDto {
            monthly_amount: retainer.monthly_amount(),
            retainer,
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<InvoiceStatus>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<InvoiceStatus>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn list_invoices(
    Query(params): Query<InvoiceQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceDto>>, AppError> {
    let status = parse_status(params.status.as_deref())?;
    let invoices = or_empty(state.repo.list_invoices(status).await, "invoices");
    Ok(Json(invoices.into_iter().map(InvoiceDto::from).collect()))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewInvoice>,
) -> Result<(StatusCode, Json<InvoiceDto>), AppError> {
    let input = input.validate()?;
    let invoice = state
        .repo
        .insert_invoice(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %invoice.id, number = %invoice.number, "Invoice created");
    Ok((StatusCode::CREATED, Json(InvoiceDto::from(invoice))))
}

pub async fn get_invoice(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<InvoiceDto>, AppError> {
    state
        .repo
        .get_invoice(&id)
        .await?
        .map(|invoice| Json(InvoiceDto::from(invoice)))
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))
}

pub async fn list_proposals(State(state): State<AppState>) -> Json<Vec<Proposal>> {
    Json(or_empty(state.repo.list_proposals().await, "proposals"))
}

pub async fn create_proposal(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewProposal>,
) -> Result<(StatusCode, Json<Proposal>), AppError> {
    let input = input.validate()?;
    let proposal = state
        .repo
        .insert_proposal(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %proposal.id, "Proposal created");
    Ok((StatusCode::CREATED, Json(proposal)))
}

pub async fn list_retainers(State(state): State<AppState>) -> Json<Vec<RetainerDto>> {
    let retainers = or_empty(state.repo.list_retainers().await, "retainers");
    Json(retainers.into_iter().map(RetainerDto::from).collect())
}

pub async fn create_retainer(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewRetainer>,
) -> Result<(StatusCode, Json<RetainerDto>), AppError> {
    let input = input.validate()?;
    let retainer = state
        .repo
        .insert_retainer(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %retainer.id, name = %retainer.name, "Retainer created");
    Ok((StatusCode::CREATED, Json(RetainerDto::from(retainer))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, RetainerStatus};
    use chrono::NaiveDate;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_status(Some("overdue")).unwrap(),
            Some(InvoiceStatus::Overdue)
        );
        assert!(matches!(
            parse_status(Some("unpaid")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_retainer_dto_carries_monthly_amount() {
        let retainer = Retainer {
            id: "r1".to_string(),
            client_id: None,
            name: "Support".to_string(),
            amount: Decimal::from_str_canonical("3000").unwrap(),
            billing_cycle: BillingCycle::Quarterly,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
            status: RetainerStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(RetainerDto::from(retainer)).unwrap();
        assert_eq!(json["monthlyAmount"], 1000.0);
        assert_eq!(json["billingCycle"], "quarterly");
        assert_eq!(json["name"], "Support");
    }
}
