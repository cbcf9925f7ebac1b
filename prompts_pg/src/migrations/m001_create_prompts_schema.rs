//! Migration 001: Create the prompts schema.
//!
//! Creates the `prompts` table with its counter columns and the three event
//! tables the counters are derived from. `prompts` starts with the legacy
//! `"totalVotes"` counter; migration 003 replaces it with `likes`.
//!
//! Column names are camelCase and quoted, matching the tables the web
//! service already reads. Existing tables are adopted as they are, so this
//! migration is forward-only: reverting it would drop prompts and events
//! that predate it.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::{Migration, MigrationError};

/// Creates `prompts`, `prompt_copies`, `anonymous_prompt_copies` and `prompt_votes`.
pub struct CreatePromptsSchema;

#[async_trait]
impl Migration for CreatePromptsSchema {
    fn version(&self) -> i64 {
        1
    }

    fn name(&self) -> &'static str {
        "create_prompts_schema"
    }

    async fn up<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id UUID PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                "imagePath" TEXT,
                "totalCopies" INTEGER NOT NULL DEFAULT 0,
                "totalVotes" INTEGER NOT NULL DEFAULT 0,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_copies (
                id UUID PRIMARY KEY,
                "promptId" UUID NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
                "userId" UUID NOT NULL,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS anonymous_prompt_copies (
                id UUID PRIMARY KEY,
                "promptId" UUID NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut **tx)
        .await?;

        // Repeated votes by the same user are allowed, hence no unique key.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompt_votes (
                id UUID PRIMARY KEY,
                "promptId" UUID NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
                "userId" UUID NOT NULL,
                "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_prompt_copies_prompt_id ON prompt_copies("promptId")"#,
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_anonymous_prompt_copies_prompt_id
            ON anonymous_prompt_copies("promptId")
            "#,
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_prompt_votes_prompt_user
            ON prompt_votes("promptId", "userId")
            "#,
        )
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// The tables may have held prompts before this migration adopted them.
    fn reversible(&self) -> bool {
        false
    }

    async fn down<'a>(&self, _tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError> {
        Err(MigrationError::Irreversible {
            version: self.version(),
            name: self.name().to_string(),
        })
    }
}
