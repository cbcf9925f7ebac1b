//! Migration 003: Replace `prompts."totalVotes"` with `likes`.
//!
//! 1. Adds `likes INTEGER NOT NULL DEFAULT 0` unless it already exists.
//! 2. Sets `likes` to the number of distinct users who voted for the prompt.
//!    A user who voted several times counts once.
//! 3. Drops the legacy `"totalVotes"` column if it is still there.
//!
//! Reverting re-adds `"totalVotes"` with value 0 and keeps `likes`. The
//! original per-prompt vote totals cannot be rebuilt from `likes`.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{Migration, MigrationError};
use crate::counters::RECOMPUTE_LIKES;

/// Backfills `likes` from `prompt_votes` and drops `"totalVotes"`.
pub struct MigrateVotesToLikes;

#[async_trait]
impl Migration for MigrateVotesToLikes {
    fn version(&self) -> i64 {
        3
    }

    fn name(&self) -> &'static str {
        "migrate_votes_to_likes"
    }

    async fn up<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            ALTER TABLE prompts
            ADD COLUMN IF NOT EXISTS likes INTEGER NOT NULL DEFAULT 0
            "#,
        )
        .execute(&mut **tx)
        .await?;

        let updated = sqlx::query(RECOMPUTE_LIKES)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        log::debug!("Backfilled likes of {} prompts", updated);

        sqlx::query(r#"ALTER TABLE prompts DROP COLUMN IF EXISTS "totalVotes""#)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn down<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            ALTER TABLE prompts
            ADD COLUMN IF NOT EXISTS "totalVotes" INTEGER NOT NULL DEFAULT 0
            "#,
        )
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
