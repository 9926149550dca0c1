use log::warn;

use crate::db::DirectoryStore;
use crate::errors::StoreError;
use crate::models::category::{Category, CategoryView};
use crate::models::employee::Employee;

/// The category holding `employee`'s ledger, if there is one.
///
/// Several matches are possible (nothing in the store prevents two clients
/// from creating the same title); the first one is used and the rest are
/// reported.
pub async fn resolve_ledger(
    store: &dyn DirectoryStore,
    employee: &Employee,
) -> Result<Option<Category>, StoreError> {
    let mut matches = store.find_ledger_categories(employee).await?;
    if matches.len() > 1 {
        warn!(
            "{} ledger categories match employee {} ('{}'); using {}",
            matches.len(),
            employee.id,
            employee.ledger_title(),
            matches[0].id
        );
    }
    if matches.is_empty() {
        return Ok(None);
    }
    Ok(Some(matches.swap_remove(0)))
}

/// Ledger projected for the transaction-history viewer.
pub async fn resolve_history(
    store: &dyn DirectoryStore,
    employee: &Employee,
) -> Result<Option<CategoryView>, StoreError> {
    Ok(resolve_ledger(store, employee).await?.map(CategoryView::from))
}

/// Keeps the ledger attached after an edit: retitles it when the name key
/// changed and binds it to the employee id. Returns the ledger id touched.
pub async fn sync_ledger(
    store: &dyn DirectoryStore,
    before: &Employee,
    after: &Employee,
) -> Result<Option<uuid::Uuid>, StoreError> {
    let Some(ledger) = resolve_ledger(store, before).await? else {
        return Ok(None);
    };

    let title = after.ledger_title();
    if ledger.title == title && ledger.employee_id == Some(after.id) {
        return Ok(None);
    }

    store.relink_category(ledger.id, &title, after.id).await?;
    log::info!("Ledger {} now '{}' for employee {}", ledger.id, title, after.id);
    Ok(Some(ledger.id))
}
