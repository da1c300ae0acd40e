use crate::errors::AppError;
use crate::store::{CheckInStore, StoreEvent};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<CheckInStore>>,
}

impl AppState {
    pub fn new(mut store: CheckInStore) -> Self {
        let goal = store.config().goal;
        store.subscribe(move |event| {
            let StoreEvent::CheckedIn { attendee, total, .. } = event;
            if *total == goal {
                info!(goal, team = %attendee.team, "attendance goal reached");
            }
        });

        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs a query against the store. Queries never touch storage.
    pub fn read<R>(&self, query: impl FnOnce(&CheckInStore) -> R) -> Result<R, AppError> {
        let store = self.store.lock().map_err(AppError::internal)?;
        Ok(query(&*store))
    }

    /// Runs a mutation on the blocking pool, since it persists through the
    /// synchronous storage provider.
    pub async fn write<R>(
        &self,
        mutation: impl FnOnce(&mut CheckInStore) -> R + Send + 'static,
    ) -> Result<R, AppError>
    where
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut store = store.lock().map_err(AppError::internal)?;
            Ok(mutation(&mut *store))
        })
        .await
        .map_err(AppError::internal)?
    }
}
