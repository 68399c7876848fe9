use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ledger::MonthQuery;
use crate::api::{or_empty, AppState};
use crate::domain::{
    Client, ClientStatus, Decimal, Expense, Income, Invoice, InvoiceStatus, Month, Retainer,
};
use crate::engine::aggregate::monthly_series;
use crate::engine::{FinanceSummary, MonthlyBucket};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

fn parse_year(raw: Option<&str>) -> Result<i32, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing required query parameter: year".into()))?;
    raw.parse::<i32>()
        .ok()
        .filter(|y| (1..=9999).contains(y))
        .ok_or_else(|| AppError::BadRequest(format!("invalid year: {raw}")))
}

pub async fn get_summary(
    Query(params): Query<MonthQuery>,
    State(state): State<AppState>,
) -> Result<Json<FinanceSummary>, AppError> {
    let month = params.parse()?;

    let result = futures::try_join!(
        state.repo.list_income(month.as_ref()),
        state.repo.list_expenses(month.as_ref()),
    );

    let summary = match result {
        Ok((income, expenses)) => FinanceSummary::build(month, &income, &expenses),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load ledger, returning empty summary");
            FinanceSummary::empty(month)
        }
    };
    Ok(Json(summary))
}

pub async fn get_monthly(
    Query(params): Query<YearQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyBucket>>, AppError> {
    let year = parse_year(params.year.as_deref())?;

    let (income, expenses) = state
        .repo
        .list_ledger_for_year(year)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, year, "Failed to load ledger, returning zero buckets");
            (Vec::new(), Vec::new())
        });

    Ok(Json(monthly_series(&income, &expenses, year)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCounts {
    pub total: usize,
    pub active: usize,
    pub leads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOverview {
    pub outstanding_count: usize,
    pub outstanding_total: Decimal,
    pub overdue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainerOverview {
    pub active_count: usize,
    pub monthly_recurring_revenue: Decimal,
}

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub clients: ClientCounts,
    pub invoices: InvoiceOverview,
    pub retainers: RetainerOverview,
    pub current_month: FinanceSummary,
}

impl Dashboard {
    pub fn build(
        today: NaiveDate,
        clients: &[Client],
        invoices: &[Invoice],
        retainers: &[Retainer],
        income: &[Income],
        expenses: &[Expense],
    ) -> Self {
        let count_status =
            |status: ClientStatus| clients.iter().filter(|c| c.status == status).count();

        let outstanding: Vec<&Invoice> = invoices
            .iter()
            .filter(|i| i.status.is_outstanding())
            .collect();

        let active: Vec<&Retainer> = retainers.iter().filter(|r| r.is_active_on(today)).collect();

        Dashboard {
            clients: ClientCounts {
                total: clients.len(),
                active: count_status(ClientStatus::Active),
                leads: count_status(ClientStatus::Lead),
            },
            invoices: InvoiceOverview {
                outstanding_count: outstanding.len(),
                outstanding_total: outstanding.iter().map(|i| i.totals().total).sum(),
                overdue_count: outstanding
                    .iter()
                    .filter(|i| i.status == InvoiceStatus::Overdue)
                    .count(),
            },
            retainers: RetainerOverview {
                active_count: active.len(),
                monthly_recurring_revenue: active.iter().map(|r| r.monthly_amount()).sum(),
            },
            current_month: FinanceSummary::build(Some(Month::of(today)), income, expenses),
        }
    }
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    let today = Utc::now().date_naive();
    let month = Month::of(today);

    let (clients, invoices, retainers, income, expenses) = futures::join!(
        state.repo.list_clients(),
        state.repo.list_invoices(None),
        state.repo.list_retainers(),
        state.repo.list_income(Some(&month)),
        state.repo.list_expenses(Some(&month)),
    );

    Json(Dashboard::build(
        today,
        &or_empty(clients, "clients"),
        &or_empty(invoices, "invoices"),
        &or_empty(retainers, "retainers"),
        &or_empty(income, "income"),
        &or_empty(expenses, "expenses"),
    ))
}
