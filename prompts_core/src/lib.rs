//! # Prompts core
//!
//! Domain types, counter arithmetic and storage seams shared by the prompt
//! backends, plus the media URL helpers used to render avatars and prompt
//! images.

#![deny(missing_docs)]

/// Pure arithmetic behind the denormalized prompt counters
pub mod counters;
/// Media URL resolution for avatars and prompt images
pub mod media;
mod prompt;
/// The storage seam implemented by the in-memory and postgres backends
pub mod store;

pub use counters::CounterDrift;
pub use media::{MediaConfig, MediaConfigError, MediaUrls, resolve_media_url};
pub use prompt::{CopyActor, CopyEvent, NewPrompt, Prompt, VoteEvent};
pub use store::PromptStore;

pub mod prelude {
    //! The prelude module for the `prompts_core` crate.
    pub use super::{
        CopyActor, CopyEvent, CounterDrift, MediaConfig, MediaUrls, NewPrompt, Prompt,
        PromptStore, VoteEvent,
    };
}
