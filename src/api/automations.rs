use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::extract::JsonBody;
use crate::api::{or_empty, AppState};
use crate::domain::{Automation, NewAutomation, NewCredential, RedactedCredential};
use crate::error::AppError;

pub async fn list_automations(State(state): State<AppState>) -> Json<Vec<Automation>> {
    Json(or_empty(state.repo.list_automations().await, "automations"))
}

pub async fn create_automation(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewAutomation>,
) -> Result<(StatusCode, Json<Automation>), AppError> {
    let input = input.validate()?;
    let automation = state
        .repo
        .insert_automation(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %automation.id, trigger = %automation.trigger, "Automation created");
    Ok((StatusCode::CREATED, Json(automation)))
}

/// Credentials are only ever served redacted.
pub async fn list_credentials(State(state): State<AppState>) -> Json<Vec<RedactedCredential>> {
    let credentials = or_empty(state.repo.list_credentials().await, "credentials");
    Json(credentials.iter().map(|c| c.redacted()).collect())
}

pub async fn create_credential(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewCredential>,
) -> Result<(StatusCode, Json<RedactedCredential>), AppError> {
    let input = input.validate()?;
    let credential = state
        .repo
        .insert_credential(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %credential.id, provider = %credential.provider, "Credential stored");
    Ok((StatusCode::CREATED, Json(credential.redacted())))
}
