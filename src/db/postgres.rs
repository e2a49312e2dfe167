use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    models::{Reading, Trigger},
    Store, StoreFuture,
};

/// `Store` backed by the `readings` and `triggers` tables.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Store for PgStore {
    fn insert_reading<'a>(&'a self, reading: &'a Reading) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO readings
                    (id, user_id, device_id, humidity, pressure, temperature, gas_resistance, created_on)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(reading.id)
            .bind(&reading.user_id)
            .bind(&reading.device_id)
            .bind(reading.humidity)
            .bind(reading.pressure)
            .bind(reading.temperature)
            .bind(reading.gas_resistance)
            .bind(reading.created_on)
            .execute(&self.pool)
            .await
            .context("failed to insert reading")?;
            Ok(())
        })
    }

    fn find_triggers<'a>(
        &'a self,
        user_id: &'a str,
        device_id: &'a str,
    ) -> StoreFuture<'a, Vec<Trigger>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, Trigger>(
                r#"
                SELECT id, user_id, device_id, name, post_url, threshold,
                       parameter, operator, created_on
                FROM triggers
                WHERE user_id   = $1
                  AND device_id = $2
                ORDER BY created_on ASC
                "#,
            )
            .bind(user_id)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await
            .context("failed to query triggers")?;
            Ok(rows)
        })
    }

    fn insert_trigger<'a>(&'a self, trigger: &'a Trigger) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO triggers
                    (id, user_id, device_id, name, post_url, threshold, parameter, operator, created_on)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(trigger.id)
            .bind(&trigger.user_id)
            .bind(&trigger.device_id)
            .bind(&trigger.name)
            .bind(&trigger.post_url)
            .bind(trigger.threshold)
            .bind(&trigger.parameter)
            .bind(&trigger.operator)
            .bind(trigger.created_on)
            .execute(&self.pool)
            .await
            .context("failed to insert trigger")?;
            Ok(())
        })
    }

    fn delete_trigger(&self, id: Uuid) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM triggers WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .context("failed to delete trigger")?;
            Ok(result.rows_affected() > 0)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{SubsecRound, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::*;
    use crate::db::models::NewReading;

    fn trigger(user_id: &str, device_id: &str, parameter: &str, operator: &str) -> Trigger {
        Trigger {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            device_id: device_id.to_owned(),
            name: format!("{parameter} {operator}"),
            post_url: "http://localhost/hook".to_owned(),
            threshold: 10.0,
            parameter: parameter.to_owned(),
            operator: operator.to_owned(),
            created_on: Utc::now().trunc_subsecs(6),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn insert_reading_round_trips(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        let reading = NewReading {
            humidity: Some(55.0),
            gas_resistance: Some(12000.0),
            ..NewReading::default()
        }
        .into_reading("user-1", "device-1");

        store.insert_reading(&reading).await.unwrap();

        let stored = sqlx::query_as::<_, Reading>("SELECT * FROM readings WHERE id = $1")
            .bind(reading.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, reading);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_reading_id_is_rejected(pool: PgPool) {
        let store = PgStore::new(pool);
        let reading = NewReading::default().into_reading("user-1", "device-1");

        store.insert_reading(&reading).await.unwrap();
        assert!(store.insert_reading(&reading).await.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn find_triggers_filters_by_owner_pair(pool: PgPool) {
        let store = PgStore::new(pool);
        let mine = trigger("user-1", "device-1", "humidity", "gte");
        store.insert_trigger(&mine).await.unwrap();
        store
            .insert_trigger(&trigger("user-1", "device-2", "humidity", "gte"))
            .await
            .unwrap();
        store
            .insert_trigger(&trigger("user-2", "device-1", "humidity", "gte"))
            .await
            .unwrap();

        let found = store.find_triggers("user-1", "device-1").await.unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn corrupt_operator_does_not_break_lookup(pool: PgPool) {
        let store = PgStore::new(pool);
        store
            .insert_trigger(&trigger("user-1", "device-1", "pressure", "between"))
            .await
            .unwrap();

        let found = store.find_triggers("user-1", "device-1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].operator, "between");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_trigger_reports_whether_a_row_was_removed(pool: PgPool) {
        let store = PgStore::new(pool);
        let t = trigger("user-1", "device-1", "temperature", "lt");
        store.insert_trigger(&t).await.unwrap();

        assert!(store.delete_trigger(t.id).await.unwrap());
        assert!(!store.delete_trigger(t.id).await.unwrap());
        let left = store.find_triggers("user-1", "device-1").await.unwrap();
        assert!(left.is_empty());
    }
}
