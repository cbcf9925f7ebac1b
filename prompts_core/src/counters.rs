//! The arithmetic behind `totalCopies` and `likes`.
//!
//! Both counters are derived values: `totalCopies` is the number of named
//! copies plus the number of anonymous copies, and `likes` is the number of
//! distinct voters. Backends that cannot express these in SQL use the
//! functions below, and the drift report compares stored counters against
//! them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CopyActor, CopyEvent, VoteEvent};

/// Converts a row count into the `INTEGER` domain of the counter columns.
pub fn clamp_count(count: i64) -> i32 {
    i32::try_from(count.max(0)).unwrap_or(i32::MAX)
}

/// Sums the named and anonymous copy counts of a prompt.
///
/// A missing sub-count (no matching rows) counts as zero.
pub fn copy_total(named: Option<i64>, anonymous: Option<i64>) -> i32 {
    clamp_count(named.unwrap_or(0).saturating_add(anonymous.unwrap_or(0)))
}

/// Counts named and anonymous copies of `prompt_id`.
pub fn copy_counts<'a, I>(copies: I, prompt_id: Uuid) -> (i64, i64)
where
    I: IntoIterator<Item = &'a CopyEvent>,
{
    copies
        .into_iter()
        .filter(|c| c.prompt_id == prompt_id)
        .fold((0, 0), |(named, anonymous), c| match c.actor {
            CopyActor::User(_) => (named + 1, anonymous),
            CopyActor::Anonymous => (named, anonymous + 1),
        })
}

/// Counts the distinct users who voted for `prompt_id`.
pub fn distinct_voters<'a, I>(votes: I, prompt_id: Uuid) -> i32
where
    I: IntoIterator<Item = &'a VoteEvent>,
{
    let voters: HashSet<Uuid> = votes
        .into_iter()
        .filter(|v| v.prompt_id == prompt_id)
        .map(|v| v.user_id)
        .collect();
    clamp_count(voters.len() as i64)
}

/// A prompt whose stored counters differ from the recomputed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDrift {
    /// The affected prompt.
    pub prompt_id: Uuid,
    /// Value of `totalCopies` as stored.
    pub stored_total_copies: i32,
    /// Value of `totalCopies` recomputed from the copy tables.
    pub expected_total_copies: i32,
    /// Value of `likes` as stored.
    pub stored_likes: i32,
    /// Value of `likes` recomputed from the votes table.
    pub expected_likes: i32,
}

impl CounterDrift {
    /// Builds a drift entry, returning `None` when both counters agree.
    pub fn detect(
        prompt_id: Uuid,
        (stored_total_copies, expected_total_copies): (i32, i32),
        (stored_likes, expected_likes): (i32, i32),
    ) -> Option<Self> {
        let drift = Self {
            prompt_id,
            stored_total_copies,
            expected_total_copies,
            stored_likes,
            expected_likes,
        };
        (drift.copies_drifted() || drift.likes_drifted()).then_some(drift)
    }

    /// Whether `totalCopies` is out of sync.
    pub fn copies_drifted(&self) -> bool {
        self.stored_total_copies != self.expected_total_copies
    }

    /// Whether `likes` is out of sync.
    pub fn likes_drifted(&self) -> bool {
        self.stored_likes != self.expected_likes
    }
}

impl std::fmt::Display for CounterDrift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: totalCopies {} (expected {}), likes {} (expected {})",
            self.prompt_id,
            self.stored_total_copies,
            self.expected_total_copies,
            self.stored_likes,
            self.expected_likes
        )
    }
}
