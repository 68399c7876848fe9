use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::{or_empty, AppState};
use crate::domain::ledger::{parse_expense_csv, parse_income_csv};
use crate::domain::{Expense, Income, Month, NewExpense, NewIncome};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    /// Parsed `?month=YYYY-MM`; absent or blank means no filter.
    pub fn parse(&self) -> Result<Option<Month>, AppError> {
        self.month
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Month>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

pub async fn list_income(
    Query(params): Query<MonthQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Income>>, AppError> {
    let month = params.parse()?;
    Ok(Json(or_empty(
        state.repo.list_income(month.as_ref()).await,
        "income",
    )))
}

pub async fn create_income(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewIncome>,
) -> Result<(StatusCode, Json<Income>), AppError> {
    let input = input.validate()?;
    let income = state
        .repo
        .insert_income(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %income.id, amount = %income.amount, "Income recorded");
    Ok((StatusCode::CREATED, Json(income)))
}

/// Bulk insert from a CSV body (`date,amount,category,description`).
pub async fn import_income(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let rows = parse_income_csv(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let imported = state
        .repo
        .insert_income_batch(rows)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(imported, "Income CSV imported");
    Ok((StatusCode::CREATED, Json(ImportResponse { imported })))
}

pub async fn list_expenses(
    Query(params): Query<MonthQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let month = params.parse()?;
    Ok(Json(or_empty(
        state.repo.list_expenses(month.as_ref()).await,
        "expenses",
    )))
}

pub async fn create_expense(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let input = input.validate()?;
    let expense = state
        .repo
        .insert_expense(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %expense.id, amount = %expense.amount, "Expense recorded");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Bulk insert from a CSV body (`date,amount,category,vendor,description`).
pub async fn import_expenses(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let rows = parse_expense_csv(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let imported = state
        .repo
        .insert_expenses_batch(rows)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(imported, "Expense CSV imported");
    Ok((StatusCode::CREATED, Json(ImportResponse { imported })))
}
