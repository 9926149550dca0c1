pub mod feed;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::{Backend, Config};
use crate::errors::StoreError;
use crate::models::category::Category;
use crate::models::employee::{Employee, NewEmployee};
use crate::models::transaction::Transaction;

pub use feed::{ChangeFeed, LiveFeed, Subscription};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Everything the directory needs from the document store.
///
/// Implementations must order `list_employees` by last name ascending and
/// must signal `changes()` after every employee mutation, including ones made
/// by other clients when the backend can observe them.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    /// `None` when no employee has this id.
    async fn update_employee(
        &self,
        id: Uuid,
        changes: NewEmployee,
    ) -> Result<Option<Employee>, StoreError>;

    async fn delete_employee(&self, id: Uuid) -> Result<(), StoreError>;

    /// Row-2 categories linked to `employee`: by `employee_id` first, then
    /// legacy unlinked categories whose title equals the name key.
    async fn find_ledger_categories(&self, employee: &Employee)
        -> Result<Vec<Category>, StoreError>;

    /// Retitles a category and binds it to an employee.
    async fn relink_category(
        &self,
        id: Uuid,
        title: &str,
        employee_id: Uuid,
    ) -> Result<(), StoreError>;

    /// Removes a category; with `cascade` its transactions go too.
    async fn delete_category(
        &self,
        id: Uuid,
        display_name: &str,
        cascade: bool,
    ) -> Result<(), StoreError>;

    async fn list_transactions(&self, category_id: Uuid) -> Result<Vec<Transaction>, StoreError>;

    fn changes(&self) -> broadcast::Receiver<()>;
}

pub async fn create_store(config: &Config) -> Result<Arc<dyn DirectoryStore>, StoreError> {
    match config.backend {
        Backend::Memory => {
            log::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                StoreError::Unavailable("DATABASE_URL must be set for the postgres backend".to_string())
            })?;
            Ok(Arc::new(PgStore::connect(database_url).await?))
        }
    }
}
