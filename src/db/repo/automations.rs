//! Automation and credential operations for the repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::Repository;
use crate::domain::primitives::{new_id, now_rfc3339};
use crate::domain::{Automation, Credential, NewAutomation, NewCredential};

fn automation_from_row(row: &SqliteRow) -> Result<Automation, sqlx::Error> {
    Ok(Automation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        trigger: row.try_get("trigger_event")?,
        enabled: row.try_get("enabled")?,
        workflow_id: row.try_get("workflow_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn credential_from_row(row: &SqliteRow) -> Result<Credential, sqlx::Error> {
    Ok(Credential {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        provider: row.try_get("provider")?,
        secret: row.try_get("secret")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) async fn insert_automation_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewAutomation,
) -> Result<Automation, sqlx::Error> {
    let automation = Automation {
        id: new_id(),
        name: input.name,
        description: input.description,
        trigger: input.trigger,
        enabled: input.enabled,
        workflow_id: input.workflow_id,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO automations (id, name, description, trigger_event, enabled, workflow_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(automation.id.as_str())
    .bind(automation.name.as_str())
    .bind(automation.description.as_deref())
    .bind(automation.trigger.as_str())
    .bind(automation.enabled)
    .bind(automation.workflow_id.as_deref())
    .bind(automation.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(automation)
}

impl Repository {
    /// Insert an automation.
    ///
    /// # Errors
    /// Returns an error if the insert fails or `workflow_id` names no workflow.
    pub async fn insert_automation(&self, input: NewAutomation) -> Result<Automation, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let automation = insert_automation_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(automation)
    }

    pub async fn list_automations(&self) -> Result<Vec<Automation>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, trigger_event, enabled, workflow_id, created_at
            FROM automations
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(automation_from_row).collect()
    }

    pub async fn insert_credential(&self, input: NewCredential) -> Result<Credential, sqlx::Error> {
        let credential = Credential {
            id: new_id(),
            name: input.name,
            provider: input.provider,
            secret: input.secret,
            created_at: now_rfc3339(),
        };

        sqlx::query(
            r#"
            INSERT INTO credentials (id, name, provider, secret, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(credential.id.as_str())
        .bind(credential.name.as_str())
        .bind(credential.provider.as_str())
        .bind(credential.secret.as_str())
        .bind(credential.created_at.as_str())
        .execute(&self.pool)
        .await?;

        Ok(credential)
    }

    /// List stored credentials including their secrets. Callers redact.
    pub async fn list_credentials(&self) -> Result<Vec<Credential>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, provider, secret, created_at
            FROM credentials
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(credential_from_row).collect()
    }
}
