//! # Prompts
//!
//! Counter bookkeeping and media URL helpers for the R1 Prompts service.

#![deny(missing_docs)]

pub use prompts_core::*;

#[cfg(feature = "in-memory")]
/// In-memory prompt store.
pub mod mem {
    //! Contains the in-memory backend for the `prompts` crate.
    pub use prompts_mem::*;
}

#[cfg(feature = "postgres")]
/// Postgres prompt store and migrations.
pub mod pg {
    //! Contains the postgres backend and migrator for the `prompts` crate.
    pub use prompts_pg::*;
}

pub mod prelude {
    //! The prelude module for the `prompts` crate.
    pub use prompts_core::prelude::*;

    #[cfg(feature = "in-memory")]
    pub use super::mem::*;
    #[cfg(feature = "postgres")]
    pub use super::pg::{Migrator, PgPromptStore};
}
