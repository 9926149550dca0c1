use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::db::DirectoryStore;
use crate::errors::StoreError;
use crate::models::category::{Category, LEDGER_ROW};
use crate::models::employee::{Employee, NewEmployee};
use crate::models::transaction::Transaction;
use crate::services::search::sort_by_last_name;

#[derive(Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    // insertion order decides which of several matching ledgers comes first
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

/// Process-local store with the same contract as [`PgStore`](crate::db::PgStore).
pub struct MemoryStore {
    tables: RwLock<Tables>,
    changes: broadcast::Sender<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        MemoryStore {
            tables: RwLock::new(Tables::default()),
            changes,
        }
    }

    pub async fn insert_category(
        &self,
        title: &str,
        amount: f64,
        icon: &str,
        color: &str,
        row: i32,
        employee_id: Option<Uuid>,
    ) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            title: title.to_string(),
            amount,
            icon: icon.to_string(),
            color: color.to_string(),
            ledger_row: row,
            employee_id,
        };
        self.tables.write().await.categories.push(category.clone());
        category
    }

    pub async fn insert_transaction(&self, category_id: Uuid, amount: f64, note: &str) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            category_id,
            amount,
            note: note.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.transactions.push(transaction.clone());
        transaction
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.tables.read().await.categories.clone()
    }

    pub async fn transaction_count(&self) -> usize {
        self.tables.read().await.transactions.len()
    }

    /// Number of live change subscribers.
    pub fn watchers(&self) -> usize {
        self.changes.receiver_count()
    }

    fn notify(&self) {
        // no receivers is fine: nobody is watching the feed
        let _ = self.changes.send(());
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> =
            self.tables.read().await.employees.values().cloned().collect();
        sort_by_last_name(&mut employees);
        Ok(employees)
    }

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn create_employee(&self, new_employee: NewEmployee) -> Result<Employee, StoreError> {
        let employee = Employee {
            id: Uuid::new_v4(),
            last_name: new_employee.last_name,
            first_name: new_employee.first_name,
            middle_name: new_employee.middle_name,
            iin: new_employee.iin,
            phone: new_employee.phone,
            position: new_employee.position,
            salary: new_employee.salary,
            email: new_employee.email,
            created_at: Some(Utc::now()),
        };
        self.tables
            .write()
            .await
            .employees
            .insert(employee.id, employee.clone());
        self.notify();
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: Uuid,
        changes: NewEmployee,
    ) -> Result<Option<Employee>, StoreError> {
        let updated = {
            let mut tables = self.tables.write().await;
            match tables.employees.get_mut(&id) {
                Some(employee) => {
                    employee.apply(changes);
                    Some(employee.clone())
                }
                None => None,
            }
        };
        if updated.is_some() {
            self.notify();
        }
        Ok(updated)
    }

    async fn delete_employee(&self, id: Uuid) -> Result<(), StoreError> {
        let removed = self.tables.write().await.employees.remove(&id);
        if removed.is_some() {
            self.notify();
        }
        Ok(())
    }

    async fn find_ledger_categories(
        &self,
        employee: &Employee,
    ) -> Result<Vec<Category>, StoreError> {
        let title = employee.ledger_title();
        let tables = self.tables.read().await;
        let ledgers = tables.categories.iter().filter(|c| c.ledger_row == LEDGER_ROW);

        let linked = ledgers
            .clone()
            .filter(|c| c.employee_id == Some(employee.id));
        let legacy = ledgers.filter(|c| c.employee_id.is_none() && c.title == title);

        Ok(linked.chain(legacy).cloned().collect())
    }

    async fn relink_category(
        &self,
        id: Uuid,
        title: &str,
        employee_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) {
            category.title = title.to_string();
            category.employee_id = Some(employee_id);
        }
        Ok(())
    }

    async fn delete_category(
        &self,
        id: Uuid,
        display_name: &str,
        cascade: bool,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.categories.retain(|c| c.id != id);
        if cascade {
            tables.transactions.retain(|t| t.category_id != id);
        }
        log::info!("Deleted category '{}' (cascade: {})", display_name, cascade);
        Ok(())
    }

    async fn list_transactions(&self, category_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let tables = self.tables.read().await;
        let mut transactions: Vec<Transaction> = tables
            .transactions
            .iter()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    fn changes(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }
}
