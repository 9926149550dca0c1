use std::sync::Arc;

use log::{debug, error};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;

use crate::db::DirectoryStore;
use crate::models::employee::Employee;
use crate::services::search::sort_by_last_name;

pub type OnChange = Box<dyn Fn(Vec<Employee>) + Send + Sync + 'static>;

/// Push feed of the full, ordered employee set.
pub trait ChangeFeed: Send + Sync {
    /// Calls `on_change` with the current set right away and again after
    /// every change, until the returned handle is released.
    fn subscribe(&self, on_change: OnChange) -> Subscription;
}

/// Handle for a live subscription. Released exactly once, either through
/// [`Subscription::unsubscribe`] or on drop.
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    fn new(task: JoinHandle<()>) -> Self {
        Subscription { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Employee feed subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Feed that re-reads the store whenever it signals a change.
#[derive(Clone)]
pub struct LiveFeed {
    store: Arc<dyn DirectoryStore>,
}

impl LiveFeed {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        LiveFeed { store }
    }
}

impl ChangeFeed for LiveFeed {
    fn subscribe(&self, on_change: OnChange) -> Subscription {
        let store = self.store.clone();
        // subscribe before the first read so a change in between is not lost
        let mut changes = store.changes();

        let task = tokio::spawn(async move {
            debug!("Employee feed subscription started");
            loop {
                match store.list_employees().await {
                    Ok(mut employees) => {
                        sort_by_last_name(&mut employees);
                        on_change(employees);
                    }
                    Err(err) => error!("Failed to refresh employee feed: {}", err),
                }

                match changes.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
                // coalesce a burst into one re-read
                loop {
                    match changes.try_recv() {
                        Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Closed) => return,
                    }
                }
            }
            debug!("Employee feed closed by the store");
        });

        Subscription::new(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::employee::NewEmployee;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn new_employee(last_name: &str) -> NewEmployee {
        NewEmployee {
            last_name: last_name.to_string(),
            first_name: "Test".to_string(),
            iin: "900101300123".to_string(),
            email: "test@example.com".to_string(),
            ..NewEmployee::default()
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Vec<Employee>>) -> Vec<Employee> {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("snapshot in time")
            .expect("feed open")
    }

    #[tokio::test]
    async fn delivers_initial_and_updated_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let feed = LiveFeed::new(store.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe(Box::new(move |employees| {
            let _ = tx.send(employees);
        }));

        assert!(next(&mut rx).await.is_empty());
        assert!(subscription.is_active());

        store.create_employee(new_employee("Petrov")).await.expect("create");
        store.create_employee(new_employee("Ivanov")).await.expect("create");

        let mut latest = next(&mut rx).await;
        while latest.len() < 2 {
            latest = next(&mut rx).await;
        }
        let names: Vec<&str> = latest.iter().map(|e| e.last_name.as_str()).collect();
        assert_eq!(names, vec!["Ivanov", "Petrov"]);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let store = Arc::new(MemoryStore::new());
        let feed = LiveFeed::new(store.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe(Box::new(move |employees| {
            let _ = tx.send(employees);
        }));
        next(&mut rx).await;

        subscription.unsubscribe();
        store.create_employee(new_employee("Kim")).await.expect("create");

        // the aborted task drops the callback and with it the sender
        let after = timeout(Duration::from_secs(2), rx.recv()).await.expect("channel settles");
        assert!(after.is_none());
    }
}
