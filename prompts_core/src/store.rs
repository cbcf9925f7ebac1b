//! Prompt counter storage definitions

use async_trait::async_trait;
use uuid::Uuid;

use crate::{CopyActor, CounterDrift, NewPrompt, Prompt};

/// `PromptStore` records copy and vote events for prompts and keeps the
/// denormalized `totalCopies` and `likes` counters in sync with them.
///
/// Recording operations update the counter in the same unit of work as the
/// event they record. The bulk operations recompute every counter from the
/// event tables and are safe to run any number of times.
#[async_trait]
pub trait PromptStore {
    /// The error returned by the backend
    type Error: std::error::Error + Send + Sync;

    /// Creates a prompt with zeroed counters.
    async fn create_prompt(&self, prompt: NewPrompt) -> Result<Prompt, Self::Error>;

    /// Retrieves a prompt by id.
    async fn fetch_prompt(&self, id: Uuid) -> Result<Option<Prompt>, Self::Error>;

    /// Records a copy of the prompt and increments `totalCopies`.
    async fn record_copy(&self, prompt_id: Uuid, actor: CopyActor)
    -> Result<Prompt, Self::Error>;

    /// Records a vote and sets `likes` to the prompt's distinct-voter count.
    async fn record_vote(&self, prompt_id: Uuid, user_id: Uuid) -> Result<Prompt, Self::Error>;

    /// Recomputes `totalCopies` of every prompt from the copy tables.
    ///
    /// Returns the number of prompts visited.
    async fn reconcile_copy_totals(&self) -> Result<u64, Self::Error>;

    /// Recomputes `likes` of every prompt from the distinct voters.
    ///
    /// Returns the number of prompts visited.
    async fn recompute_likes(&self) -> Result<u64, Self::Error>;

    /// Lists the prompts whose stored counters disagree with the event tables.
    async fn counter_drift(&self) -> Result<Vec<CounterDrift>, Self::Error>;
}
