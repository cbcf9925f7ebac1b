use async_trait::async_trait;
use prompts_core::counters::{clamp_count, copy_total};
use prompts_core::{CopyActor, CounterDrift, NewPrompt, Prompt, PromptStore};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::counters::{COUNTER_SNAPSHOT, RECOMPUTE_LIKES, RECONCILE_COPY_TOTALS};

/// Errors returned by [`PgPromptStore`].
#[derive(Debug, thiserror::Error)]
pub enum PgPromptStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// The referenced prompt does not exist.
    #[error("prompt {0} not found")]
    PromptNotFound(Uuid),
}

/// Prompt counter store backed by postgres.
///
/// Expects the schema produced by [`crate::migrations::Migrator::run`].
#[derive(Debug, Clone)]
pub struct PgPromptStore {
    pg: PgPool,
}

impl PgPromptStore {
    /// Creates a new `PgPromptStore` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pg: pool }
    }

    fn prompt_from_row(row: &PgRow) -> Result<Prompt, sqlx::Error> {
        Ok(Prompt {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            image_path: row.try_get("imagePath")?,
            total_copies: row.try_get("totalCopies")?,
            likes: row.try_get("likes")?,
            created_at: row.try_get("createdAt")?,
        })
    }
}

#[async_trait]
impl PromptStore for PgPromptStore {
    type Error = PgPromptStoreError;

    async fn create_prompt(&self, prompt: NewPrompt) -> Result<Prompt, Self::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO prompts (id, title, "imagePath")
            VALUES ($1, $2, $3)
            RETURNING id, title, "imagePath", "totalCopies", likes, "createdAt"
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&prompt.title)
        .bind(&prompt.image_path)
        .fetch_one(&self.pg)
        .await?;

        Ok(Self::prompt_from_row(&row)?)
    }

    async fn fetch_prompt(&self, id: Uuid) -> Result<Option<Prompt>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, title, "imagePath", "totalCopies", likes, "createdAt"
            FROM prompts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(row.as_ref().map(Self::prompt_from_row).transpose()?)
    }

    async fn record_copy(
        &self,
        prompt_id: Uuid,
        actor: CopyActor,
    ) -> Result<Prompt, Self::Error> {
        let mut tx = self.pg.begin().await?;

        // Updating first locks the prompt row for the rest of the transaction.
        let row = sqlx::query(
            r#"
            UPDATE prompts
            SET "totalCopies" = "totalCopies" + 1
            WHERE id = $1
            RETURNING id, title, "imagePath", "totalCopies", likes, "createdAt"
            "#,
        )
        .bind(prompt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PgPromptStoreError::PromptNotFound(prompt_id))?;

        match actor {
            CopyActor::User(user_id) => {
                sqlx::query(
                    r#"INSERT INTO prompt_copies (id, "promptId", "userId") VALUES ($1, $2, $3)"#,
                )
                .bind(Uuid::new_v4())
                .bind(prompt_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
            CopyActor::Anonymous => {
                sqlx::query(
                    r#"INSERT INTO anonymous_prompt_copies (id, "promptId") VALUES ($1, $2)"#,
                )
                .bind(Uuid::new_v4())
                .bind(prompt_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let prompt = Self::prompt_from_row(&row)?;
        log::debug!(
            "Recorded copy of prompt {} ({} total)",
            prompt_id,
            prompt.total_copies
        );
        Ok(prompt)
    }

    async fn record_vote(&self, prompt_id: Uuid, user_id: Uuid) -> Result<Prompt, Self::Error> {
        let mut tx = self.pg.begin().await?;

        sqlx::query("SELECT id FROM prompts WHERE id = $1 FOR UPDATE")
            .bind(prompt_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PgPromptStoreError::PromptNotFound(prompt_id))?;

        sqlx::query(r#"INSERT INTO prompt_votes (id, "promptId", "userId") VALUES ($1, $2, $3)"#)
            .bind(Uuid::new_v4())
            .bind(prompt_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            UPDATE prompts AS p
            SET likes = (
                SELECT COUNT(DISTINCT v."userId") FROM prompt_votes v WHERE v."promptId" = p.id
            )::INTEGER
            WHERE p.id = $1
            RETURNING p.id, p.title, p."imagePath", p."totalCopies", p.likes, p."createdAt"
            "#,
        )
        .bind(prompt_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let prompt = Self::prompt_from_row(&row)?;
        log::debug!("Recorded vote on prompt {} ({} likes)", prompt_id, prompt.likes);
        Ok(prompt)
    }

    async fn reconcile_copy_totals(&self) -> Result<u64, Self::Error> {
        let result = sqlx::query(RECONCILE_COPY_TOTALS).execute(&self.pg).await?;
        Ok(result.rows_affected())
    }

    async fn recompute_likes(&self) -> Result<u64, Self::Error> {
        let result = sqlx::query(RECOMPUTE_LIKES).execute(&self.pg).await?;
        Ok(result.rows_affected())
    }

    async fn counter_drift(&self) -> Result<Vec<CounterDrift>, Self::Error> {
        let rows = sqlx::query(COUNTER_SNAPSHOT).fetch_all(&self.pg).await?;

        let mut drift = Vec::new();
        for row in rows {
            let copies: i64 = row.try_get("named_and_anonymous_copies")?;
            let voters: i64 = row.try_get("distinct_voters")?;
            if let Some(entry) = CounterDrift::detect(
                row.try_get("id")?,
                (row.try_get("stored_total_copies")?, copy_total(Some(copies), None)),
                (row.try_get("stored_likes")?, clamp_count(voters)),
            ) {
                drift.push(entry);
            }
        }

        if !drift.is_empty() {
            log::warn!("{} prompts have drifted counters", drift.len());
        }
        Ok(drift)
    }
}
