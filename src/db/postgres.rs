use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::{queries, DbPool, SubscriberStore, UnwatchOutcome, WatchOutcome};
use crate::error::StoreError;
use crate::models::subscriber::SubscriberLocationRow;
use crate::models::{Coordinate, RiskLevel, Subscriber, WatchedLocation};

/// Postgres-backed subscriber store.
#[derive(Clone)]
pub struct PgSubscriberStore {
    pool: DbPool,
}

impl PgSubscriberStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    async fn find_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let rows: Vec<SubscriberLocationRow> =
            sqlx::query_as(queries::SELECT_ALL_SUBSCRIBER_LOCATIONS)
                .fetch_all(&self.pool)
                .await?;
        Ok(Subscriber::from_rows(rows))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        let rows: Vec<SubscriberLocationRow> =
            sqlx::query_as(queries::SELECT_SUBSCRIBER_LOCATIONS_BY_EMAIL)
                .bind(email)
                .fetch_all(&self.pool)
                .await?;
        Ok(Subscriber::from_rows(rows).into_iter().next())
    }

    async fn record_notified_level(
        &self,
        subscriber: &Subscriber,
        coordinate: &Coordinate,
        level: RiskLevel,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(queries::UPDATE_NOTIFIED_LEVEL)
            .bind(subscriber.id)
            .bind(coordinate.latitude)
            .bind(coordinate.longitude)
            .bind(level.as_str())
            .execute(&self.pool)
            .await?;

        // Zero rows means the location was removed since the snapshot.
        if result.rows_affected() == 0 {
            debug!(
                "No location {} left for {}, level not recorded",
                coordinate, subscriber.email
            );
        }
        Ok(())
    }

    async fn watch(
        &self,
        name: &str,
        email: &str,
        location: &WatchedLocation,
    ) -> Result<WatchOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (mut subscriber, created) = match load_locked(&mut tx, email).await? {
            Some(existing) => (existing, false),
            None => {
                let subscriber = Subscriber::new(name, email);
                sqlx::query(queries::INSERT_SUBSCRIBER)
                    .bind(subscriber.id)
                    .bind(&subscriber.name)
                    .bind(&subscriber.email)
                    .execute(&mut *tx)
                    .await?;
                info!("Created subscriber {} ({})", email, subscriber.id);
                (subscriber, true)
            }
        };

        if !subscriber.watch(location.clone()) {
            tx.commit().await?;
            return Ok(WatchOutcome::AlreadyWatched);
        }

        sqlx::query(queries::INSERT_WATCHED_LOCATION)
            .bind(subscriber.id)
            .bind(location.coordinate.latitude)
            .bind(location.coordinate.longitude)
            .bind(&location.display_name)
            .bind(subscriber.last_notified_level(&location.coordinate).as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(if created {
            WatchOutcome::Created
        } else {
            WatchOutcome::Added
        })
    }

    async fn unwatch(
        &self,
        email: &str,
        coordinate: &Coordinate,
    ) -> Result<UnwatchOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut subscriber = load_locked(&mut tx, email)
            .await?
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

        if !subscriber.is_watching(coordinate) {
            tx.commit().await?;
            return Ok(UnwatchOutcome::NotWatched);
        }

        sqlx::query(queries::DELETE_WATCHED_LOCATION)
            .bind(subscriber.id)
            .bind(coordinate.latitude)
            .bind(coordinate.longitude)
            .execute(&mut *tx)
            .await?;

        let emptied = subscriber.unwatch(coordinate);
        if emptied {
            sqlx::query(queries::DELETE_SUBSCRIBER)
                .bind(subscriber.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if emptied {
            info!("Removed last location, deleted subscriber {}", email);
            Ok(UnwatchOutcome::SubscriberDeleted)
        } else {
            Ok(UnwatchOutcome::Removed)
        }
    }
}

/// Lock the subscriber row for `email` and load it with its locations.
async fn load_locked(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> Result<Option<Subscriber>, StoreError> {
    let id: Uuid = match sqlx::query(queries::SELECT_SUBSCRIBER_BY_EMAIL)
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?
    {
        Some(row) => row.try_get("id")?,
        None => return Ok(None),
    };

    let rows: Vec<SubscriberLocationRow> =
        sqlx::query_as(queries::SELECT_SUBSCRIBER_LOCATIONS_BY_EMAIL)
            .bind(email)
            .fetch_all(&mut **tx)
            .await?;

    Ok(Some(
        Subscriber::from_rows(rows)
            .into_iter()
            .next()
            .unwrap_or_else(|| Subscriber {
                id,
                ..Subscriber::new(String::new(), email)
            }),
    ))
}
