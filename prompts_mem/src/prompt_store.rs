use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use prompts_core::counters::{copy_counts, copy_total, distinct_voters};
use prompts_core::{CopyActor, CopyEvent, CounterDrift, NewPrompt, Prompt, PromptStore, VoteEvent};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Errors returned by [`MemPromptStore`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemPromptStoreError {
    /// The referenced prompt does not exist.
    #[error("prompt {0} not found")]
    PromptNotFound(Uuid),
}

#[derive(Debug, Default)]
struct Tables {
    prompts: HashMap<Uuid, Prompt>,
    copies: Vec<CopyEvent>,
    votes: Vec<VoteEvent>,
}

impl Tables {
    fn prompt_mut(&mut self, id: Uuid) -> Result<&mut Prompt, MemPromptStoreError> {
        self.prompts
            .get_mut(&id)
            .ok_or(MemPromptStoreError::PromptNotFound(id))
    }
}

fn expected_total_copies(copies: &[CopyEvent], prompt_id: Uuid) -> i32 {
    let (named, anonymous) = copy_counts(copies, prompt_id);
    copy_total(Some(named), Some(anonymous))
}

/// An in-memory prompt store.
///
/// Prompts, copy events and vote events live behind a single async mutex,
/// so every operation observes and updates the tables atomically.
#[derive(Clone, Debug, Default)]
pub struct MemPromptStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemPromptStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a prompt with the given counters as-is.
    ///
    /// Useful to seed stale counters before exercising the reconciliation.
    pub async fn insert_prompt(&self, prompt: Prompt) {
        self.tables.lock().await.prompts.insert(prompt.id, prompt);
    }

    /// Appends a copy event without touching `totalCopies`.
    pub async fn insert_copy_event(&self, event: CopyEvent) {
        self.tables.lock().await.copies.push(event);
    }

    /// Appends a vote event without touching `likes`.
    pub async fn insert_vote_event(&self, event: VoteEvent) {
        self.tables.lock().await.votes.push(event);
    }
}

#[async_trait]
impl PromptStore for MemPromptStore {
    type Error = MemPromptStoreError;

    async fn create_prompt(&self, prompt: NewPrompt) -> Result<Prompt, Self::Error> {
        let prompt = Prompt {
            id: Uuid::new_v4(),
            title: prompt.title,
            image_path: prompt.image_path,
            total_copies: 0,
            likes: 0,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .await
            .prompts
            .insert(prompt.id, prompt.clone());
        Ok(prompt)
    }

    async fn fetch_prompt(&self, id: Uuid) -> Result<Option<Prompt>, Self::Error> {
        let tables = self.tables.lock().await;
        Ok(tables.prompts.get(&id).cloned())
    }

    async fn record_copy(
        &self,
        prompt_id: Uuid,
        actor: CopyActor,
    ) -> Result<Prompt, Self::Error> {
        let mut tables = self.tables.lock().await;
        tables.prompt_mut(prompt_id)?;
        tables.copies.push(CopyEvent {
            id: Uuid::new_v4(),
            prompt_id,
            actor,
            created_at: Utc::now(),
        });
        let prompt = tables.prompt_mut(prompt_id)?;
        prompt.total_copies = prompt.total_copies.saturating_add(1);
        log::debug!(
            "Recorded copy of prompt {} ({} total)",
            prompt_id,
            prompt.total_copies
        );
        Ok(prompt.clone())
    }

    async fn record_vote(&self, prompt_id: Uuid, user_id: Uuid) -> Result<Prompt, Self::Error> {
        let mut tables = self.tables.lock().await;
        tables.prompt_mut(prompt_id)?;
        tables.votes.push(VoteEvent {
            id: Uuid::new_v4(),
            prompt_id,
            user_id,
            created_at: Utc::now(),
        });
        let likes = distinct_voters(&tables.votes, prompt_id);
        let prompt = tables.prompt_mut(prompt_id)?;
        prompt.likes = likes;
        log::debug!("Recorded vote on prompt {} ({} likes)", prompt_id, likes);
        Ok(prompt.clone())
    }

    async fn reconcile_copy_totals(&self) -> Result<u64, Self::Error> {
        let mut tables = self.tables.lock().await;
        let Tables {
            prompts, copies, ..
        } = &mut *tables;
        for prompt in prompts.values_mut() {
            prompt.total_copies = expected_total_copies(copies, prompt.id);
        }
        Ok(prompts.len() as u64)
    }

    async fn recompute_likes(&self) -> Result<u64, Self::Error> {
        let mut tables = self.tables.lock().await;
        let Tables { prompts, votes, .. } = &mut *tables;
        for prompt in prompts.values_mut() {
            prompt.likes = distinct_voters(votes.iter(), prompt.id);
        }
        Ok(prompts.len() as u64)
    }

    async fn counter_drift(&self) -> Result<Vec<CounterDrift>, Self::Error> {
        let tables = self.tables.lock().await;
        let mut prompts: Vec<&Prompt> = tables.prompts.values().collect();
        prompts.sort_by_key(|p| (p.created_at, p.id));
        let drift: Vec<CounterDrift> = prompts
            .into_iter()
            .filter_map(|p| {
                CounterDrift::detect(
                    p.id,
                    (p.total_copies, expected_total_copies(&tables.copies, p.id)),
                    (p.likes, distinct_voters(&tables.votes, p.id)),
                )
            })
            .collect();
        if !drift.is_empty() {
            log::warn!("{} prompts have drifted counters", drift.len());
        }
        Ok(drift)
    }
}
