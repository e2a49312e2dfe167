use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use super::validate::{validate, ValidationError};
use crate::{
    db::{
        models::{NewReading, Reading},
        Store,
    },
    pipeline::EvaluationQueue,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid reading: {0}")]
    Invalid(#[from] ValidationError),
    #[error("failed to persist reading")]
    Storage(#[source] anyhow::Error),
}

/// Accepts readings from authenticated devices.
///
/// A reading is validated, stamped and stored; once the insert succeeds it is
/// handed to the evaluation queue and returned without waiting for any
/// trigger to be evaluated.
#[derive(Clone)]
pub struct ReadingService {
    store: Arc<dyn Store>,
    queue: EvaluationQueue,
}

impl ReadingService {
    pub fn new(store: Arc<dyn Store>, queue: EvaluationQueue) -> Self {
        Self { store, queue }
    }

    pub async fn ingest(
        &self,
        user_id: &str,
        device_id: &str,
        values: NewReading,
    ) -> Result<Reading, IngestError> {
        validate(&values)?;

        let reading = values.into_reading(user_id, device_id);
        if let Err(e) = self.store.insert_reading(&reading).await {
            error!(
                user_id = %user_id,
                device_id = %device_id,
                error = ?e,
                "Failed to persist reading"
            );
            return Err(IngestError::Storage(e));
        }

        info!(reading_id = %reading.id, device_id = %device_id, "Reading persisted");
        self.queue.submit(reading.clone());

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use anyhow::bail;
    use chrono::Utc;
    use tokio::time::timeout;
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::{models::Trigger, MemoryStore, StoreFuture},
        notify::{recording::RecordingNotifier, Dispatcher},
        pipeline::evaluation_queue,
    };

    /// Rejects every reading insert; trigger operations always succeed.
    struct ReadOnlyStore;

    impl Store for ReadOnlyStore {
        fn insert_reading<'a>(&'a self, _: &'a Reading) -> StoreFuture<'a, ()> {
            Box::pin(async { bail!("database is read-only") })
        }
        fn find_triggers<'a>(&'a self, _: &'a str, _: &'a str) -> StoreFuture<'a, Vec<Trigger>> {
            Box::pin(async { Ok(Vec::new()) })
        }
        fn insert_trigger<'a>(&'a self, _: &'a Trigger) -> StoreFuture<'a, ()> {
            Box::pin(async { Ok(()) })
        }
        fn delete_trigger(&self, _: Uuid) -> StoreFuture<'_, bool> {
            Box::pin(async { Ok(false) })
        }
    }

    /// Stores readings in memory but fails every trigger lookup.
    #[derive(Default)]
    struct LookupFailingStore {
        inner: MemoryStore,
        lookups: AtomicUsize,
    }

    impl Store for LookupFailingStore {
        fn insert_reading<'a>(&'a self, reading: &'a Reading) -> StoreFuture<'a, ()> {
            self.inner.insert_reading(reading)
        }
        fn find_triggers<'a>(&'a self, _: &'a str, _: &'a str) -> StoreFuture<'a, Vec<Trigger>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { bail!("connection reset") })
        }
        fn insert_trigger<'a>(&'a self, trigger: &'a Trigger) -> StoreFuture<'a, ()> {
            self.inner.insert_trigger(trigger)
        }
        fn delete_trigger(&self, id: Uuid) -> StoreFuture<'_, bool> {
            self.inner.delete_trigger(id)
        }
    }

    fn open_window_trigger() -> Trigger {
        Trigger {
            id: Uuid::new_v4(),
            user_id: "user-1".to_owned(),
            device_id: "device-1".to_owned(),
            name: "open window".to_owned(),
            post_url: "http://window/open".to_owned(),
            threshold: 80.0,
            parameter: "humidity".to_owned(),
            operator: "gte".to_owned(),
            created_on: Utc::now(),
        }
    }

    #[tokio::test]
    async fn valid_reading_is_stored_and_evaluated() {
        let store = MemoryStore::new();
        store.insert_trigger(&open_window_trigger()).await.unwrap();
        let (notifier, mut calls) = RecordingNotifier::new();
        let (queue, worker) = evaluation_queue(
            Arc::new(store.clone()),
            Dispatcher::new(Arc::new(notifier)),
        );
        tokio::spawn(worker.run());
        let service = ReadingService::new(Arc::new(store.clone()), queue);

        let reading = service
            .ingest(
                "user-1",
                "device-1",
                NewReading {
                    humidity: Some(85.0),
                    ..NewReading::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(store.readings().await, vec![reading]);
        let url = timeout(Duration::from_secs(2), calls.recv()).await.unwrap();
        assert_eq!(url.as_deref(), Some("http://window/open"));
    }

    #[tokio::test]
    async fn invalid_reading_is_not_stored() {
        let store = MemoryStore::new();
        let (notifier, _calls) = RecordingNotifier::new();
        let (queue, _worker) = evaluation_queue(
            Arc::new(store.clone()),
            Dispatcher::new(Arc::new(notifier)),
        );
        let service = ReadingService::new(Arc::new(store.clone()), queue);

        let err = service
            .ingest(
                "user-1",
                "device-1",
                NewReading {
                    humidity: Some(140.0),
                    ..NewReading::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Invalid(_)));
        assert!(store.readings().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_skips_evaluation() {
        let (notifier, mut calls) = RecordingNotifier::new();
        let (queue, worker) = evaluation_queue(
            Arc::new(ReadOnlyStore),
            Dispatcher::new(Arc::new(notifier)),
        );
        tokio::spawn(worker.run());
        let service = ReadingService::new(Arc::new(ReadOnlyStore), queue);

        let err = service
            .ingest("user-1", "device-1", NewReading::default())
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Storage(_)));
        assert!(timeout(Duration::from_millis(200), calls.recv()).await.is_err());
    }

    #[tokio::test]
    async fn ingest_succeeds_without_a_running_worker() {
        let store = MemoryStore::new();
        let (notifier, _calls) = RecordingNotifier::new();
        let (queue, worker) = evaluation_queue(
            Arc::new(store.clone()),
            Dispatcher::new(Arc::new(notifier)),
        );
        drop(worker);
        let service = ReadingService::new(Arc::new(store.clone()), queue);

        let reading = service
            .ingest("user-1", "device-1", NewReading::default())
            .await
            .unwrap();
        assert_eq!(store.readings().await, vec![reading]);
    }

    #[tokio::test]
    async fn failed_trigger_lookup_does_not_affect_ingestion() {
        let store = Arc::new(LookupFailingStore::default());
        let (notifier, mut calls) = RecordingNotifier::new();
        let (queue, worker) =
            evaluation_queue(store.clone(), Dispatcher::new(Arc::new(notifier)));
        let worker = tokio::spawn(worker.run());
        let service = ReadingService::new(store.clone(), queue);

        let reading = service
            .ingest(
                "user-1",
                "device-1",
                NewReading {
                    humidity: Some(85.0),
                    ..NewReading::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.inner.readings().await, vec![reading]);

        drop(service);
        timeout(Duration::from_secs(2), worker).await.unwrap().unwrap();
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
        assert!(calls.try_recv().is_err());
    }
}
