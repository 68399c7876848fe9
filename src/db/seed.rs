//! Static fixture data for demo and development databases.
//!
//! Fixtures live in `fixtures.json`. Records refer to each other by a
//! fixture-local `key` (`clientKey`, `workflowKey`) which is resolved to the
//! generated ids at insert time.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use crate::db::repo::{
    insert_automation_in, insert_client_in, insert_expense_in, insert_income_in,
    insert_invoice_in, insert_proposal_in, insert_retainer_in, insert_workflow_in,
};
use crate::db::Repository;
use crate::domain::{
    NewAutomation, NewClient, NewExpense, NewIncome, NewInvoice, NewProposal, NewRetainer,
    NewWorkflow, ValidationError,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("fixture file is malformed: {0}")]
    Fixture(#[from] serde_json::Error),
    #[error("fixture record is invalid: {0}")]
    Invalid(#[from] ValidationError),
    #[error("fixture refers to unknown key {0}")]
    UnknownKey(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
struct Keyed<T> {
    key: String,
    #[serde(flatten)]
    record: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientLinked<T> {
    #[serde(default)]
    client_key: Option<String>,
    #[serde(flatten)]
    record: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowLinked<T> {
    #[serde(default)]
    workflow_key: Option<String>,
    #[serde(flatten)]
    record: T,
}

#[derive(Debug, Deserialize)]
struct Fixtures {
    clients: Vec<Keyed<NewClient>>,
    invoices: Vec<ClientLinked<NewInvoice>>,
    proposals: Vec<ClientLinked<NewProposal>>,
    retainers: Vec<ClientLinked<NewRetainer>>,
    income: Vec<ClientLinked<NewIncome>>,
    expenses: Vec<NewExpense>,
    workflows: Vec<Keyed<NewWorkflow>>,
    automations: Vec<WorkflowLinked<NewAutomation>>,
}

fn resolve(ids: &HashMap<String, String>, key: Option<String>) -> Result<Option<String>, SeedError> {
    key.map(|k| ids.get(&k).cloned().ok_or(SeedError::UnknownKey(k)))
        .transpose()
}

/// Insert the fixture set unless the database already has clients.
///
/// The whole set is written in one transaction, so a failure leaves the
/// database empty and the next start tries again.
///
/// Returns the number of records inserted (0 when skipped).
pub async fn seed_fixtures(repo: &Repository) -> Result<usize, SeedError> {
    if repo.count_rows("clients").await? > 0 {
        info!("Clients present, skipping fixture seed");
        return Ok(0);
    }

    let fixtures: Fixtures = serde_json::from_str(include_str!("fixtures.json"))?;
    let mut tx = repo.pool().begin().await?;
    let mut inserted = 0usize;

    let mut client_ids = HashMap::new();
    for Keyed { key, record } in fixtures.clients {
        let client = insert_client_in(&mut tx, record.validate()?).await?;
        client_ids.insert(key, client.id);
        inserted += 1;
    }

    for ClientLinked { client_key, mut record } in fixtures.invoices {
        record.client_id = resolve(&client_ids, client_key)?;
        insert_invoice_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    for ClientLinked { client_key, mut record } in fixtures.proposals {
        record.client_id = resolve(&client_ids, client_key)?;
        insert_proposal_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    for ClientLinked { client_key, mut record } in fixtures.retainers {
        record.client_id = resolve(&client_ids, client_key)?;
        insert_retainer_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    for ClientLinked { client_key, mut record } in fixtures.income {
        record.client_id = resolve(&client_ids, client_key)?;
        insert_income_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    for record in fixtures.expenses {
        insert_expense_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    let mut workflow_ids = HashMap::new();
    for Keyed { key, record } in fixtures.workflows {
        let (workflow, _) = insert_workflow_in(&mut tx, record.validate()?).await?;
        workflow_ids.insert(key, workflow.id);
        inserted += 1;
    }

    for WorkflowLinked { workflow_key, mut record } in fixtures.automations {
        record.workflow_id = resolve(&workflow_ids, workflow_key)?;
        insert_automation_in(&mut tx, record.validate()?).await?;
        inserted += 1;
    }

    tx.commit().await?;
    info!(records = inserted, "Fixture data seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repo::test_support::repo;
    use crate::domain::ClientStatus;

    #[tokio::test]
    async fn test_seed_populates_every_table() {
        let (repo, _temp) = repo().await;
        let inserted = seed_fixtures(&repo).await.unwrap();
        assert_eq!(inserted, 3 + 3 + 2 + 2 + 4 + 5 + 1 + 1);

        let clients = repo.list_clients().await.unwrap();
        assert_eq!(clients.len(), 3);
        assert!(clients.iter().any(|c| c.status == ClientStatus::Lead));

        let invoices = repo.list_invoices(None).await.unwrap();
        assert!(invoices.iter().all(|i| i.client_id.is_some()));

        let automations = repo.list_automations().await.unwrap();
        assert!(automations[0].workflow_id.is_some());

        let workflows = repo.list_workflows().await.unwrap();
        let latest = repo
            .latest_workflow_version(&workflows[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.graph.nodes.len(), 3);
        assert_eq!(latest.graph.edges.len(), 2);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_database() {
        let (repo, _temp) = repo().await;
        seed_fixtures(&repo).await.unwrap();
        assert_eq!(seed_fixtures(&repo).await.unwrap(), 0);
        assert_eq!(repo.count_rows("clients").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_seed_leaves_database_empty() {
        let (repo, _temp) = repo().await;
        // Automations are written last; losing their table fails the seed
        // after every other table has received rows.
        sqlx::query("DROP TABLE automations")
            .execute(repo.pool())
            .await
            .unwrap();

        let err = seed_fixtures(&repo).await.unwrap_err();
        assert!(matches!(err, SeedError::Database(_)), "{err:?}");

        for table in ["clients", "invoices", "income", "expenses", "workflows"] {
            assert_eq!(repo.count_rows(table).await.unwrap(), 0, "{table}");
        }

        crate::db::migrations::run_migrations(repo.pool()).await.unwrap();
        assert_eq!(seed_fixtures(&repo).await.unwrap(), 21);
    }

    #[test]
    fn test_resolve_unknown_key() {
        let ids = HashMap::new();
        assert!(matches!(
            resolve(&ids, Some("ghost".to_string())),
            Err(SeedError::UnknownKey(k)) if k == "ghost"
        ));
        assert!(resolve(&ids, None).unwrap().is_none());
    }
}
