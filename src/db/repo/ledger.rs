//! Income and expense operations for the repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::{date_text, get_date, get_decimal, Repository};
use crate::domain::primitives::{new_id, now_rfc3339};
use crate::domain::{Expense, Income, Month, NewExpense, NewIncome};

fn income_from_row(row: &SqliteRow) -> Result<Income, sqlx::Error> {
    Ok(Income {
        id: row.try_get("id")?,
        date: get_date(row, "date")?,
        amount: get_decimal(row, "amount")?,
        category: row.try_get("category")?,
        client_id: row.try_get("client_id")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn expense_from_row(row: &SqliteRow) -> Result<Expense, sqlx::Error> {
    Ok(Expense {
        id: row.try_get("id")?,
        date: get_date(row, "date")?,
        amount: get_decimal(row, "amount")?,
        category: row.try_get("category")?,
        vendor: row.try_get("vendor")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

/// `LIKE` pattern matching every ISO date in `month`.
fn month_pattern(month: &Month) -> String {
    format!("{}-%", month.prefix())
}

pub(crate) async fn insert_income_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewIncome,
) -> Result<Income, sqlx::Error> {
    let income = Income {
        id: new_id(),
        date: input.date,
        amount: input.amount,
        category: input.category,
        client_id: input.client_id,
        description: input.description,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO income (id, date, amount, category, client_id, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(income.id.as_str())
    .bind(date_text(income.date))
    .bind(income.amount.to_canonical_string())
    .bind(income.category.as_str())
    .bind(income.client_id.as_deref())
    .bind(income.description.as_deref())
    .bind(income.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(income)
}

pub(crate) async fn insert_expense_in(
    tx: &mut Transaction<'_, Sqlite>,
    input: NewExpense,
) -> Result<Expense, sqlx::Error> {
    let expense = Expense {
        id: new_id(),
        date: input.date,
        amount: input.amount,
        category: input.category,
        vendor: input.vendor,
        description: input.description,
        created_at: now_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO expenses (id, date, amount, category, vendor, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(expense.id.as_str())
    .bind(date_text(expense.date))
    .bind(expense.amount.to_canonical_string())
    .bind(expense.category.as_str())
    .bind(expense.vendor.as_deref())
    .bind(expense.description.as_deref())
    .bind(expense.created_at.as_str())
    .execute(&mut **tx)
    .await?;

    Ok(expense)
}

impl Repository {
    pub async fn insert_income(&self, input: NewIncome) -> Result<Income, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let income = insert_income_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(income)
    }

    /// Insert many income rows in a single transaction.
    ///
    /// Either every row is stored or none is.
    pub async fn insert_income_batch(&self, inputs: Vec<NewIncome>) -> Result<usize, sqlx::Error> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;
        for input in inputs {
            insert_income_in(&mut tx, input).await?;
            inserted += 1;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// List income, newest date first, optionally restricted to one month.
    pub async fn list_income(&self, month: Option<&Month>) -> Result<Vec<Income>, sqlx::Error> {
        let rows = match month {
            Some(month) => {
                sqlx::query(
                    r#"
                    SELECT id, date, amount, category, client_id, description, created_at
                    FROM income
                    WHERE date LIKE ?
                    ORDER BY date DESC, created_at DESC
                    "#,
                )
                .bind(month_pattern(month))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, date, amount, category, client_id, description, created_at
                    FROM income
                    ORDER BY date DESC, created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(income_from_row).collect()
    }

    pub async fn insert_expense(&self, input: NewExpense) -> Result<Expense, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let expense = insert_expense_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(expense)
    }

    /// Insert many expense rows in a single transaction.
    pub async fn insert_expenses_batch(
        &self,
        inputs: Vec<NewExpense>,
    ) -> Result<usize, sqlx::Error> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;
        for input in inputs {
            insert_expense_in(&mut tx, input).await?;
            inserted += 1;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// List expenses, newest date first, optionally restricted to one month.
    pub async fn list_expenses(&self, month: Option<&Month>) -> Result<Vec<Expense>, sqlx::Error> {
        let rows = match month {
            Some(month) => {
                sqlx::query(
                    r#"
                    SELECT id, date, amount, category, vendor, description, created_at
                    FROM expenses
                    WHERE date LIKE ?
                    ORDER BY date DESC, created_at DESC
                    "#,
                )
                .bind(month_pattern(month))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, date, amount, category, vendor, description, created_at
                    FROM expenses
                    ORDER BY date DESC, created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(expense_from_row).collect()
    }

    /// Income and expenses dated within `year`.
    pub async fn list_ledger_for_year(
        &self,
        year: i32,
    ) -> Result<(Vec<Income>, Vec<Expense>), sqlx::Error> {
        let pattern = format!("{year:04}-%");
        let income = sqlx::query(
            r#"
            SELECT id, date, amount, category, client_id, description, created_at
            FROM income
            WHERE date LIKE ?
            ORDER BY date ASC
            "#,
        )
        .bind(pattern.as_str())
        .fetch_all(&self.pool);
        let expenses = sqlx::query(
            r#"
            SELECT id, date, amount, category, vendor, description, created_at
            FROM expenses
            WHERE date LIKE ?
            ORDER BY date ASC
            "#,
        )
        .bind(pattern.as_str())
        .fetch_all(&self.pool);

        let (income_rows, expense_rows) = futures::try_join!(income, expenses)?;
        let income = income_rows
            .iter()
            .map(income_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let expenses = expense_rows
            .iter()
            .map(expense_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((income, expenses))
    }
}
