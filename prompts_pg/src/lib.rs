//! # Prompts postgres store

#![deny(missing_docs)]

/// SQL shared by the counter migrations and the prompt store
pub mod counters;

/// Database migrations for the prompts schema and its counter repairs
pub mod migrations;

/// The prompt counter store implementation for postgres
pub mod prompt_store;

pub use migrations::{AppliedMigration, Migration, MigrationError, Migrator};
pub use prompt_store::*;
