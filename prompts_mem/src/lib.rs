//! # Prompts memory store
//!
//! In-memory implementation of [`prompts_core::PromptStore`], primarily for
//! testing code that records copies and votes without a database.
//!
//! ```ignore
//! use prompts_core::prelude::*;
//! use prompts_mem::MemPromptStore;
//!
//! let store = MemPromptStore::new();
//! let prompt = store.create_prompt(NewPrompt::new("Summarize")).await?;
//! store.record_copy(prompt.id, CopyActor::Anonymous).await?;
//! ```

#![deny(missing_docs)]

mod prompt_store;

pub use prompt_store::*;
