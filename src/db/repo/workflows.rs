//! Workflow and workflow version operations for the repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{get_json, get_parsed, Repository};
use crate::domain::primitives::{new_id, now_rfc3339};
use crate::domain::{Graph, NewWorkflow, Workflow, WorkflowVersion};

fn workflow_from_row(row: &SqliteRow) -> Result<Workflow, sqlx::Error> {
    Ok(Workflow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        status: get_parsed(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn version_from_row(row: &SqliteRow) -> Result<WorkflowVersion, sqlx::Error> {
    Ok(WorkflowVersion {
        workflow_id: row.try_get("workflow_id")?,
        version: row.try_get("version")?,
        graph: get_json(row, "graph")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Write `graph` as the next version of `workflow_id` inside `tx`.
///
/// The `(workflow_id, version)` primary key rejects a racing writer that
/// computed the same next version.
async fn append_version(
    tx: &mut Transaction<'_, Sqlite>,
    workflow_id: &str,
    graph: Graph,
    created_at: &str,
) -> Result<WorkflowVersion, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COALESCE(MAX(version), 0) + 1 AS next FROM workflow_versions WHERE workflow_id = ?",
    )
    .bind(workflow_id)
    .fetch_one(&mut **tx)
    .await?;
    let version: i64 = row.try_get("next")?;

    let graph_json =
        serde_json::to_string(&graph).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO workflow_versions (workflow_id, version, graph, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(workflow_id)
    .bind(version)
    .bind(graph_json)
    .bind(created_at)
    .execute(&mut **tx)
    .await?;

    Ok(WorkflowVersion {
        workflow_id: workflow_id.to_string(),
        version,
        graph,
        created_at: created_at.to_string(),
    })
}

pub(crate) async fn insert_workflow_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewWorkflow,
) -> Result<(Workflow, WorkflowVersion), sqlx::Error> {
    let now = now_rfc3339();
    let workflow = Workflow {
        id: new_id(),
        name: input.name,
        description: input.description,
        status: input.status,
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO workflows (id, name, description, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(workflow.id.as_str())
    .bind(workflow.name.as_str())
    .bind(workflow.description.as_deref())
    .bind(workflow.status.as_str())
    .bind(workflow.created_at.as_str())
    .bind(workflow.updated_at.as_str())
    .execute(&mut **tx)
    .await?;

    let version = append_version(tx, &workflow.id, input.graph.unwrap_or_default(), &now).await?;
    Ok((workflow, version))
}

impl Repository {
    /// Insert a workflow together with version 1 of its graph.
    pub async fn insert_workflow(
        &self,
        input: NewWorkflow,
    ) -> Result<(Workflow, WorkflowVersion), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_workflow_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// List workflows, most recently updated first.
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, status, created_at, updated_at
            FROM workflows
            ORDER BY updated_at DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(workflow_from_row).collect()
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, status, created_at, updated_at
            FROM workflows
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(workflow_from_row).transpose()
    }

    /// Save `graph` as the next version of a workflow and bump its
    /// `updated_at`.
    ///
    /// # Errors
    /// Returns `sqlx::Error::RowNotFound` if the workflow does not exist.
    pub async fn insert_workflow_version(
        &self,
        workflow_id: &str,
        graph: Graph,
    ) -> Result<WorkflowVersion, sqlx::Error> {
        let now = now_rfc3339();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE workflows SET updated_at = ? WHERE id = ?")
            .bind(now.as_str())
            .bind(workflow_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let version = append_version(&mut tx, workflow_id, graph, &now).await?;
        tx.commit().await?;
        Ok(version)
    }

    pub async fn latest_workflow_version(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowVersion>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT workflow_id, version, graph, created_at
            FROM workflow_versions
            WHERE workflow_id = ?
            ORDER BY version DESC
            LIMIT 1
            "#,
        )
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(version_from_row).transpose()
    }

    /// All versions of a workflow, newest first.
    pub async fn list_workflow_versions(
        &self,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowVersion>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT workflow_id, version, graph, created_at
            FROM workflow_versions
            WHERE workflow_id = ?
            ORDER BY version DESC
            "#,
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(version_from_row).collect()
    }
}
