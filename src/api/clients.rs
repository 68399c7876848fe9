use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::extract::JsonBody;
use crate::api::{or_empty, AppState};
use crate::domain::{Client, NewClient};
use crate::error::AppError;

pub async fn list_clients(State(state): State<AppState>) -> Json<Vec<Client>> {
    Json(or_empty(state.repo.list_clients().await, "clients"))
}

pub async fn create_client(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let input = input.validate()?;
    let client = state
        .repo
        .insert_client(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %client.id, name = %client.name, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Client>, AppError> {
    state
        .repo
        .get_client(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("client {id}")))
}
