//! Migration 002: Reconcile `prompts."totalCopies"`.
//!
//! Recomputes the copy counter of every prompt as the number of named copies
//! plus the number of anonymous copies. The statement fully recomputes the
//! value instead of incrementing it, so running it again yields the same
//! counters.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{Migration, MigrationError};
use crate::counters::RECONCILE_COPY_TOTALS;

/// Repairs `totalCopies` from `prompt_copies` and `anonymous_prompt_copies`.
pub struct ReconcileCopyTotals;

#[async_trait]
impl Migration for ReconcileCopyTotals {
    fn version(&self) -> i64 {
        2
    }

    fn name(&self) -> &'static str {
        "reconcile_copy_totals"
    }

    async fn up<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        let updated = sqlx::query(RECONCILE_COPY_TOTALS)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        log::debug!("Reconciled totalCopies of {} prompts", updated);

        Ok(())
    }

    /// The repaired counter is derived data; the stale values are not worth restoring.
    async fn down<'a>(&self, _tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        Ok(())
    }
}
