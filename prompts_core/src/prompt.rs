//! Prompt entities and the events that feed their counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shared prompt together with its denormalized counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Identifier of the prompt.
    pub id: Uuid,
    /// Title shown in listings.
    pub title: String,
    /// Stored image reference. May be empty, relative or an absolute URL.
    pub image_path: Option<String>,
    /// Named plus anonymous copies.
    pub total_copies: i32,
    /// Distinct users who voted for the prompt.
    pub likes: i32,
    /// When the prompt was created.
    pub created_at: DateTime<Utc>,
}

/// The data required to create a prompt. Counters always start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrompt {
    /// Title shown in listings.
    pub title: String,
    /// Optional stored image reference.
    pub image_path: Option<String>,
}

impl NewPrompt {
    /// Creates a prompt definition without an image.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_path: None,
        }
    }

    /// Attaches an image reference.
    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }
}

/// Who copied a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyActor {
    /// A signed-in user. Recorded in `prompt_copies`.
    User(Uuid),
    /// An unauthenticated visitor. Recorded in `anonymous_prompt_copies`.
    Anonymous,
}

impl CopyActor {
    /// Returns the user id for named copies.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            CopyActor::User(id) => Some(*id),
            CopyActor::Anonymous => None,
        }
    }
}

/// A single recorded copy action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyEvent {
    /// Identifier of the copy record.
    pub id: Uuid,
    /// The prompt that was copied.
    pub prompt_id: Uuid,
    /// Who copied it.
    pub actor: CopyActor,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// A single recorded vote. The same user may appear many times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    /// Identifier of the vote record.
    pub id: Uuid,
    /// The prompt voted for.
    pub prompt_id: Uuid,
    /// The voting user.
    pub user_id: Uuid,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_prompt_has_no_image_by_default() {
        let prompt = NewPrompt::new("Summarize");
        assert_eq!(prompt.title, "Summarize");
        assert!(prompt.image_path.is_none());
    }

    #[test]
    fn with_image_sets_the_path() {
        let prompt = NewPrompt::new("Summarize").with_image("uploads/a.png");
        assert_eq!(prompt.image_path.as_deref(), Some("uploads/a.png"));
    }

    #[test]
    fn copy_actor_exposes_user_id() {
        let user = Uuid::new_v4();
        assert_eq!(CopyActor::User(user).user_id(), Some(user));
        assert_eq!(CopyActor::Anonymous.user_id(), None);
    }
}
