#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::sync::broadcast;
use uuid::Uuid;

use employee_directory::db::{DirectoryStore, MemoryStore};
use employee_directory::directory::Prompt;
use employee_directory::errors::StoreError;
use employee_directory::models::category::Category;
use employee_directory::models::employee::{Employee, NewEmployee};
use employee_directory::models::transaction::Transaction;
use employee_directory::utils::jwt::Claims;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DeleteEmployee(Uuid),
    FindLedger(Uuid),
    RelinkCategory { id: Uuid, title: String },
    DeleteCategory { id: Uuid, display_name: String, cascade: bool },
}

/// Memory store that records remote calls and fails on demand.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
    pub fail_employee_delete: AtomicBool,
    pub fail_ledger_lookup: AtomicBool,
    pub fail_category_delete: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingStore::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::FindLedger(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail_if(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for RecordingStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.inner.list_employees().await
    }

    async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        self.inner.get_employee(id).await
    }

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        self.inner.create_employee(employee).await
    }

    async fn update_employee(
        &self,
        id: Uuid,
        changes: NewEmployee,
    ) -> Result<Option<Employee>, StoreError> {
        self.inner.update_employee(id, changes).await
    }

    async fn delete_employee(&self, id: Uuid) -> Result<(), StoreError> {
        self.record(Call::DeleteEmployee(id));
        Self::fail_if(&self.fail_employee_delete)?;
        self.inner.delete_employee(id).await
    }

    async fn find_ledger_categories(
        &self,
        employee: &Employee,
    ) -> Result<Vec<Category>, StoreError> {
        self.record(Call::FindLedger(employee.id));
        Self::fail_if(&self.fail_ledger_lookup)?;
        self.inner.find_ledger_categories(employee).await
    }

    async fn relink_category(
        &self,
        id: Uuid,
        title: &str,
        employee_id: Uuid,
    ) -> Result<(), StoreError> {
        self.record(Call::RelinkCategory { id, title: title.to_string() });
        self.inner.relink_category(id, title, employee_id).await
    }

    async fn delete_category(
        &self,
        id: Uuid,
        display_name: &str,
        cascade: bool,
    ) -> Result<(), StoreError> {
        self.record(Call::DeleteCategory {
            id,
            display_name: display_name.to_string(),
            cascade,
        });
        Self::fail_if(&self.fail_category_delete)?;
        self.inner.delete_category(id, display_name, cascade).await
    }

    async fn list_transactions(&self, category_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        self.inner.list_transactions(category_id).await
    }

    fn changes(&self) -> broadcast::Receiver<()> {
        self.inner.changes()
    }
}

/// Prompt with a fixed answer that remembers what it was asked.
pub struct ScriptedPrompt {
    answer: bool,
    pub confirmations: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(ScriptedPrompt {
            answer,
            confirmations: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().unwrap().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().unwrap().push(message.to_string());
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

pub fn new_employee(last_name: &str, first_name: &str, position: &str) -> NewEmployee {
    NewEmployee {
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        middle_name: String::new(),
        iin: "900101300123".to_string(),
        phone: "+7 701 000 0000".to_string(),
        position: position.to_string(),
        salary: 250000.0,
        email: format!("{}@example.com", last_name.to_lowercase()),
    }
}

/// Token as the upstream identity service would issue it.
pub fn generate_token(subject: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(7)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}
