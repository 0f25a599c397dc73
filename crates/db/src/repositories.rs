//! Postgres implementation of the store traits.
//!
//! Each submodule holds the plain queries for one table family as free
//! functions over a connection, followed by the store impl that composes them
//! inside a single transaction.

pub mod feedback;
pub mod record;
pub mod schedule;
pub mod slot;
pub mod timetable;

use eyre::WrapErr;
use sqlx::{Postgres, Transaction};
use timeline_core::errors::TimelineResult;

use crate::DbPool;

/// SQL expression for the current UTC calendar day.
pub(crate) const TODAY_UTC: &str = "(now() AT TIME ZONE 'UTC')::date";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) async fn begin(&self) -> TimelineResult<Transaction<'static, Postgres>> {
        let tx = self
            .pool
            .begin()
            .await
            .wrap_err("failed to open transaction")?;
        Ok(tx)
    }
}

pub(crate) async fn commit(tx: Transaction<'static, Postgres>) -> TimelineResult<()> {
    tx.commit().await.wrap_err("failed to commit transaction")?;
    Ok(())
}
