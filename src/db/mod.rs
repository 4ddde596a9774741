use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::error::StoreError;
use crate::models::{Coordinate, RiskLevel, Subscriber, WatchedLocation};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the subscriber tables if they do not exist yet.
pub async fn ensure_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(queries::CREATE_SUBSCRIBERS).execute(pool).await?;
    sqlx::query(queries::CREATE_WATCHED_LOCATIONS)
        .execute(pool)
        .await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// New subscriber record created with this as its first location.
    Created,
    /// Location appended to an existing subscriber.
    Added,
    /// The subscriber already watches this exact coordinate.
    AlreadyWatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwatchOutcome {
    Removed,
    /// The last location was removed and the subscriber record with it.
    SubscriberDeleted,
    NotWatched,
}

/// Narrow interface over wherever subscribers are kept.
///
/// The monitoring job only ever calls `find_all` and
/// `record_notified_level`; `watch`/`unwatch` belong to subscription
/// management.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Snapshot of every subscriber with their locations and levels.
    async fn find_all(&self) -> Result<Vec<Subscriber>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError>;

    /// Persist the last notified level of one (subscriber, coordinate)
    /// relationship, leaving every other field untouched.
    async fn record_notified_level(
        &self,
        subscriber: &Subscriber,
        coordinate: &Coordinate,
        level: RiskLevel,
    ) -> Result<(), StoreError>;

    async fn watch(
        &self,
        name: &str,
        email: &str,
        location: &WatchedLocation,
    ) -> Result<WatchOutcome, StoreError>;

    async fn unwatch(&self, email: &str, coordinate: &Coordinate)
        -> Result<UnwatchOutcome, StoreError>;
}
