use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgListener, PgPool};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::DirectoryStore;
use crate::errors::StoreError;
use crate::models::category::{Category, LEDGER_ROW};
use crate::models::employee::{Employee, NewEmployee};
use crate::models::transaction::Transaction;

/// Channel the `employees` trigger notifies on (see migrations).
pub const EMPLOYEES_CHANNEL: &str = "employees_changed";

const EMPLOYEE_COLUMNS: &str =
    "id, last_name, first_name, middle_name, iin, phone, position, salary, email, created_at";

pub struct PgStore {
    pool: PgPool,
    changes: broadcast::Sender<()>,
}

impl PgStore {
    /// Connects, applies migrations and starts forwarding change notifications.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let (changes, _) = broadcast::channel(64);
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(EMPLOYEES_CHANNEL).await?;

        let forward = changes.clone();
        tokio::spawn(async move {
            loop {
                if let Some(backoff) = relay(listener.try_recv().await, &forward) {
                    tokio::time::sleep(backoff).await;
                }
            }
        });

        log::info!("Connected to postgres, listening on '{}'", EMPLOYEES_CHANNEL);
        Ok(PgStore { pool, changes })
    }
}

/// Turns one listener outcome into a change signal. Returns how long to back off.
///
/// `Ok(None)` means the connection dropped and the next receive reconnects;
/// whatever was notified in between is lost, so subscribers must re-read.
fn relay<N>(
    received: Result<Option<N>, sqlx::Error>,
    forward: &broadcast::Sender<()>,
) -> Option<Duration> {
    let backoff = match received {
        Ok(Some(_)) => None,
        Ok(None) => {
            log::warn!("Listener connection lost, reconnecting");
            None
        }
        Err(err) => {
            log::error!("Lost employee change notifications: {:?}", err);
            Some(Duration::from_secs(1))
        }
    };
    // no receivers is fine: nobody is watching the feed
    let _ = forward.send(());
    backoff
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {} FROM employees ORDER BY last_name COLLATE \"C\", id",
            EMPLOYEE_COLUMNS
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn create_employee(&self, new_employee: NewEmployee) -> Result<Employee, StoreError> {
        let sql = format!(
            "INSERT INTO employees ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            EMPLOYEE_COLUMNS, EMPLOYEE_COLUMNS
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_employee.last_name)
            .bind(&new_employee.first_name)
            .bind(&new_employee.middle_name)
            .bind(&new_employee.iin)
            .bind(&new_employee.phone)
            .bind(&new_employee.position)
            .bind(new_employee.salary)
            .bind(&new_employee.email)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: Uuid,
        changes: NewEmployee,
    ) -> Result<Option<Employee>, StoreError> {
        let mut query: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new("UPDATE employees SET ");
        let mut separated = query.separated(", ");

        separated.push("last_name = ");
        separated.push_bind_unseparated(&changes.last_name);
        separated.push("first_name = ");
        separated.push_bind_unseparated(&changes.first_name);
        separated.push("middle_name = ");
        separated.push_bind_unseparated(&changes.middle_name);
        separated.push("iin = ");
        separated.push_bind_unseparated(&changes.iin);
        separated.push("phone = ");
        separated.push_bind_unseparated(&changes.phone);
        separated.push("position = ");
        separated.push_bind_unseparated(&changes.position);
        separated.push("salary = ");
        separated.push_bind_unseparated(changes.salary);
        separated.push("email = ");
        separated.push_bind_unseparated(&changes.email);
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", EMPLOYEE_COLUMNS));

        let employee = query
            .build_query_as::<Employee>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn delete_employee(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_ledger_categories(
        &self,
        employee: &Employee,
    ) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, title, amount, icon, color, \"row\", employee_id FROM categories
             WHERE \"row\" = $1
               AND (employee_id = $2 OR (employee_id IS NULL AND title = $3))
             ORDER BY (employee_id IS NULL), created_at, id",
        )
        .bind(LEDGER_ROW)
        .bind(employee.id)
        .bind(employee.ledger_title())
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn relink_category(
        &self,
        id: Uuid,
        title: &str,
        employee_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE categories SET title = $1, employee_id = $2 WHERE id = $3")
            .bind(title)
            .bind(employee_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_category(
        &self,
        id: Uuid,
        display_name: &str,
        cascade: bool,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        if cascade {
            sqlx::query("DELETE FROM transactions WHERE category_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::info!("Deleted category '{}' (cascade: {})", display_name, cascade);
        Ok(())
    }

    async fn list_transactions(&self, category_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT id, category_id, amount, note, created_at FROM transactions
             WHERE category_id = $1 ORDER BY created_at DESC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    fn changes(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }
}
