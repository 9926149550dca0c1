use log::{error, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DirectoryStore;
use crate::errors::StoreError;
use crate::models::employee::Employee;
use crate::services::ledger::resolve_ledger;

/// Deleting an employee never takes the ledger's transactions with it.
pub const LEDGER_CASCADE: bool = false;

#[derive(Debug, Clone, PartialEq)]
pub struct RemovalReport {
    pub employee_id: Uuid,
    /// Ledger category removed alongside the employee.
    pub ledger_id: Option<Uuid>,
}

#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("failed to delete employee {employee_id}: {source}")]
    Employee {
        employee_id: Uuid,
        #[source]
        source: StoreError,
    },
    /// The employee is gone but its ledger could not be cleaned up.
    #[error("employee {employee_id} deleted, ledger cleanup failed: {source}")]
    Ledger {
        employee_id: Uuid,
        #[source]
        source: StoreError,
    },
}

pub fn confirmation_prompt(employee: &Employee) -> String {
    format!(
        "Are you sure you want to delete employee {}?",
        employee.display_name()
    )
}

/// Deletes the employee, then its ledger category with cascading disabled.
///
/// The two deletes are independent: if the second fails the ledger is left
/// orphaned and reported through [`RemovalError::Ledger`].
pub async fn remove_employee(
    store: &dyn DirectoryStore,
    employee: &Employee,
) -> Result<RemovalReport, RemovalError> {
    store.delete_employee(employee.id).await.map_err(|source| {
        error!("Error deleting employee {}: {}", employee.id, source);
        RemovalError::Employee {
            employee_id: employee.id,
            source,
        }
    })?;
    info!("Deleted employee {} ({})", employee.id, employee.display_name());

    let ledger_failed = |source: StoreError| {
        warn!(
            "Employee {} deleted but ledger '{}' cleanup failed: {}",
            employee.id,
            employee.ledger_title(),
            source
        );
        RemovalError::Ledger {
            employee_id: employee.id,
            source,
        }
    };

    let ledger = resolve_ledger(store, employee).await.map_err(ledger_failed)?;
    let ledger_id = match ledger {
        Some(category) => {
            store
                .delete_category(category.id, &employee.display_name(), LEDGER_CASCADE)
                .await
                .map_err(ledger_failed)?;
            Some(category.id)
        }
        None => None,
    };

    Ok(RemovalReport {
        employee_id: employee.id,
        ledger_id,
    })
}
