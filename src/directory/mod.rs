//! State and actions of the employee directory screen.
//!
//! The directory owns a live feed subscription for as long as it is open,
//! keeps the search query and the current [`ViewMode`], and runs the delete
//! and history actions against the store. Drawing is left to the caller.

pub mod view;

use std::sync::Arc;

use log::error;
use thiserror::Error;
use tokio::sync::watch;

use crate::db::{ChangeFeed, DirectoryStore, Subscription};
use crate::errors::StoreError;
use crate::models::employee::Employee;
use crate::services::ledger::resolve_history;
use crate::services::removal::{confirmation_prompt, remove_employee, RemovalError, RemovalReport};
use crate::services::search::filter_employees;

pub use view::{ContextMenu, EmployeeCard, EmptyState, ViewMode};

pub const DELETE_FAILED: &str = "Failed to delete the employee";
pub const HISTORY_FAILED: &str = "Failed to load the transaction history";

/// Blocking user interaction the directory needs.
pub trait Prompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Removal(#[from] RemovalError),
    #[error("history lookup failed: {0}")]
    History(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Cancelled,
    Removed(RemovalReport),
}

pub struct EmployeeDirectory {
    store: Arc<dyn DirectoryStore>,
    prompt: Arc<dyn Prompt>,
    snapshot: watch::Receiver<Option<Vec<Employee>>>,
    subscription: Option<Subscription>,
    search: String,
    mode: ViewMode,
    menu: Option<ContextMenu>,
}

impl EmployeeDirectory {
    pub fn open(
        store: Arc<dyn DirectoryStore>,
        feed: &dyn ChangeFeed,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        let (publish, snapshot) = watch::channel(None);
        let subscription = feed.subscribe(Box::new(move |employees| {
            publish.send_replace(Some(employees));
        }));

        EmployeeDirectory {
            store,
            prompt,
            snapshot,
            subscription: Some(subscription),
            search: String::new(),
            mode: ViewMode::List,
            menu: None,
        }
    }

    /// True until the feed delivered its first snapshot.
    pub fn is_loading(&self) -> bool {
        self.snapshot.borrow().is_none()
    }

    /// Waits for the next feed snapshot. `false` once the feed has stopped.
    pub async fn refreshed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.snapshot.borrow().clone().unwrap_or_default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Employees matching the current search, in directory order.
    pub fn visible(&self) -> Vec<Employee> {
        let snapshot = self.snapshot.borrow();
        let employees = snapshot.as_deref().unwrap_or_default();
        filter_employees(employees, &self.search)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn cards(&self) -> Vec<EmployeeCard> {
        self.visible().iter().map(EmployeeCard::from).collect()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if self.is_loading() || !self.visible().is_empty() {
            return None;
        }
        if self.search.is_empty() {
            Some(EmptyState::NoEmployees)
        } else {
            Some(EmptyState::NoMatches)
        }
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn start_add(&mut self) {
        self.menu = None;
        self.mode = ViewMode::Add;
    }

    /// Back to the list from the form or the history viewer.
    pub fn back(&mut self) {
        self.mode = ViewMode::List;
    }

    pub fn open_menu(&mut self, employee: &Employee, x: i32, y: i32) {
        self.menu = Some(ContextMenu {
            employee: employee.clone(),
            x,
            y,
        });
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Edit action of the context menu.
    pub fn edit_selected(&mut self) {
        if let Some(menu) = self.menu.take() {
            self.mode = ViewMode::Edit(menu.employee.id);
        }
    }

    pub async fn delete_selected(&mut self) -> Result<DeleteOutcome, DirectoryError> {
        match self.menu.take() {
            Some(menu) => self.delete(&menu.employee).await,
            None => Ok(DeleteOutcome::Cancelled),
        }
    }

    pub async fn view_history_selected(&mut self) -> Result<(), DirectoryError> {
        match self.menu.take() {
            Some(menu) => self.view_history(&menu.employee).await,
            None => Ok(()),
        }
    }

    /// Asks for confirmation, then deletes the employee and its ledger.
    /// Failures are alerted to the user before being returned.
    pub async fn delete(&mut self, employee: &Employee) -> Result<DeleteOutcome, DirectoryError> {
        if !self.prompt.confirm(&confirmation_prompt(employee)) {
            return Ok(DeleteOutcome::Cancelled);
        }

        match remove_employee(self.store.as_ref(), employee).await {
            Ok(report) => {
                if self.mode == ViewMode::Edit(employee.id) {
                    self.mode = ViewMode::List;
                }
                Ok(DeleteOutcome::Removed(report))
            }
            Err(err) => {
                self.prompt.alert(DELETE_FAILED);
                Err(err.into())
            }
        }
    }

    /// Opens the history viewer on the employee's ledger. Without a ledger
    /// nothing happens.
    pub async fn view_history(&mut self, employee: &Employee) -> Result<(), DirectoryError> {
        match resolve_history(self.store.as_ref(), employee).await {
            Ok(Some(category)) => {
                self.mode = ViewMode::History(category);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                error!("Error fetching ledger for employee {}: {}", employee.id, err);
                self.prompt.alert(HISTORY_FAILED);
                Err(err.into())
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().map(Subscription::is_active).unwrap_or(false)
    }

    /// Tears the screen down and releases the feed.
    pub fn close(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
