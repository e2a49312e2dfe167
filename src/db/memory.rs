use std::{collections::HashMap, sync::Arc};

use anyhow::bail;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    models::{Reading, Trigger},
    Store, StoreFuture,
};

/// In-process `Store` used by tests and local runs without Postgres.
///
/// Wrapped in `Arc` so clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Arc<RwLock<HashMap<Uuid, Reading>>>,
    triggers: Arc<RwLock<Vec<Trigger>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored reading, oldest first.
    pub async fn readings(&self) -> Vec<Reading> {
        let mut all: Vec<Reading> = self.readings.read().await.values().cloned().collect();
        all.sort_by_key(|r| r.created_on);
        all
    }
}

impl Store for MemoryStore {
    fn insert_reading<'a>(&'a self, reading: &'a Reading) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut guard = self.readings.write().await;
            if guard.contains_key(&reading.id) {
                bail!("duplicate reading id: {}", reading.id);
            }
            guard.insert(reading.id, reading.clone());
            Ok(())
        })
    }

    fn find_triggers<'a>(
        &'a self,
        user_id: &'a str,
        device_id: &'a str,
    ) -> StoreFuture<'a, Vec<Trigger>> {
        Box::pin(async move {
            Ok(self
                .triggers
                .read()
                .await
                .iter()
                .filter(|t| t.user_id == user_id && t.device_id == device_id)
                .cloned()
                .collect())
        })
    }

    fn insert_trigger<'a>(&'a self, trigger: &'a Trigger) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut guard = self.triggers.write().await;
            if guard.iter().any(|t| t.id == trigger.id) {
                bail!("duplicate trigger id: {}", trigger.id);
            }
            guard.push(trigger.clone());
            Ok(())
        })
    }

    fn delete_trigger(&self, id: Uuid) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let mut guard = self.triggers.write().await;
            let before = guard.len();
            guard.retain(|t| t.id != id);
            Ok(guard.len() < before)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::models::NewReading;

    fn make_trigger(user_id: &str, device_id: &str) -> Trigger {
        Trigger {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            device_id: device_id.to_owned(),
            name: "window".to_owned(),
            post_url: "http://localhost/open".to_owned(),
            threshold: 80.0,
            parameter: "humidity".to_owned(),
            operator: "gte".to_owned(),
            created_on: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemoryStore::new();
        assert!(store.readings().await.is_empty());
        assert!(store.find_triggers("u", "d").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_reading_is_visible_through_clones() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let reading = NewReading::default().into_reading("u", "d");

        store.insert_reading(&reading).await.unwrap();

        assert_eq!(clone.readings().await, vec![reading]);
    }

    #[tokio::test]
    async fn duplicate_reading_id_errors() {
        let store = MemoryStore::new();
        let reading = NewReading::default().into_reading("u", "d");

        store.insert_reading(&reading).await.unwrap();
        let err = store.insert_reading(&reading).await.unwrap_err();
        assert!(err.to_string().contains("duplicate reading id"));
        assert_eq!(store.readings().await.len(), 1);
    }

    #[tokio::test]
    async fn find_triggers_matches_both_user_and_device() {
        let store = MemoryStore::new();
        let mine = make_trigger("user-1", "device-1");
        store.insert_trigger(&mine).await.unwrap();
        store.insert_trigger(&make_trigger("user-1", "device-2")).await.unwrap();
        store.insert_trigger(&make_trigger("user-2", "device-1")).await.unwrap();

        let found = store.find_triggers("user-1", "device-1").await.unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[tokio::test]
    async fn delete_trigger_removes_only_the_target() {
        let store = MemoryStore::new();
        let a = make_trigger("user-1", "device-1");
        let b = make_trigger("user-1", "device-1");
        store.insert_trigger(&a).await.unwrap();
        store.insert_trigger(&b).await.unwrap();

        assert!(store.delete_trigger(a.id).await.unwrap());
        assert!(!store.delete_trigger(a.id).await.unwrap());

        let left = store.find_triggers("user-1", "device-1").await.unwrap();
        assert_eq!(left, vec![b]);
    }
}
