pub mod auth;
pub mod automations;
pub mod billing;
pub mod clients;
pub mod extract;
pub mod finance;
pub mod health;
pub mod ledger;
pub mod workflows;

use crate::config::Config;
use crate::db::Repository;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }
}

/// Result of a list read. Failures are logged and answered with an empty
/// list so the dashboard keeps rendering.
pub(crate) fn or_empty<T>(result: Result<Vec<T>, sqlx::Error>, what: &'static str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to list {}, returning empty list", what);
        Vec::new()
    })
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route("/api/clients/:id", get(clients::get_client))
        .route(
            "/api/invoices",
            get(billing::list_invoices).post(billing::create_invoice),
        )
        .route("/api/invoices/:id", get(billing::get_invoice))
        .route(
            "/api/proposals",
            get(billing::list_proposals).post(billing::create_proposal),
        )
        .route(
            "/api/retainers",
            get(billing::list_retainers).post(billing::create_retainer),
        )
        .route(
            "/api/income",
            get(ledger::list_income).post(ledger::create_income),
        )
        .route("/api/income/import", post(ledger::import_income))
        .route(
            "/api/expenses",
            get(ledger::list_expenses).post(ledger::create_expense),
        )
        .route("/api/expenses/import", post(ledger::import_expenses))
        .route("/api/finance/summary", get(finance::get_summary))
        .route("/api/finance/monthly", get(finance::get_monthly))
        .route("/api/dashboard", get(finance::get_dashboard))
        .route(
            "/api/automations",
            get(automations::list_automations).post(automations::create_automation),
        )
        .route(
            "/api/credentials",
            get(automations::list_credentials).post(automations::create_credential),
        )
        .route(
            "/api/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route("/api/workflows/:id", get(workflows::get_workflow))
        .route(
            "/api/workflows/:id/versions",
            get(workflows::list_versions).post(workflows::create_version),
        )
        .route("/api/workflows/:id/graph", post(workflows::apply_graph_ops))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}
