//! Client operations for the repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{get_parsed, Repository};
use crate::domain::primitives::{new_id, now_rfc3339};
use crate::domain::{Client, NewClient};

fn client_from_row(row: &SqliteRow) -> Result<Client, sqlx::Error> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        status: get_parsed(row, "status")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) async fn insert_client_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewClient,
) -> Result<Client, sqlx::Error> {
    let client = Client {
        id: new_id(),
        name: input.name,
        company: input.company,
        email: input.email,
        phone: input.phone,
        status: input.status,
        notes: input.notes,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO clients (id, name, company, email, phone, status, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(client.id.as_str())
    .bind(client.name.as_str())
    .bind(client.company.as_deref())
    .bind(client.email.as_deref())
    .bind(client.phone.as_deref())
    .bind(client.status.as_str())
    .bind(client.notes.as_deref())
    .bind(client.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(client)
}

impl Repository {
    /// Insert a client and return the stored record.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_client(&self, input: NewClient) -> Result<Client, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let client = insert_client_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(client)
    }

    /// List clients, newest first.
    pub async fn list_clients(&self) -> Result<Vec<Client>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, company, email, phone, status, notes, created_at
            FROM clients
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(client_from_row).collect()
    }

    pub async fn get_client(&self, id: &str) -> Result<Option<Client>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, company, email, phone, status, notes, created_at
            FROM clients
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(client_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::db::repo::test_support::repo;
    use crate::domain::{ClientStatus, NewClient};

    fn input(name: &str) -> NewClient {
        NewClient {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let (repo, _temp) = repo().await;
        let mut new = input("Northwind Films");
        new.status = ClientStatus::Lead;
        new.email = Some("hello@northwind.tv".to_string());

        let created = repo.insert_client(new).await.unwrap();
        let fetched = repo.get_client(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, ClientStatus::Lead);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (repo, _temp) = repo().await;
        assert!(repo.get_client("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_returns_all() {
        let (repo, _temp) = repo().await;
        repo.insert_client(input("A")).await.unwrap();
        repo.insert_client(input("B")).await.unwrap();
        let clients = repo.list_clients().await.unwrap();
        assert_eq!(clients.len(), 2);
    }
}
