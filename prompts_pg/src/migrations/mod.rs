//! Database migration system for prompts_pg.
//!
//! This module provides a simple, embedded migration system for managing
//! the PostgreSQL schema of the prompts domain and the data repairs of its
//! denormalized counters. Migrations are versioned, checksummed, tracked in
//! the database and reversible unless they declare themselves forward-only.
//!
//! # Usage
//!
//! ```rust,ignore
//! use prompts_pg::migrations::Migrator;
//! use sqlx::PgPool;
//!
//! let pool = PgPool::connect("postgres://...").await?;
//! let migrator = Migrator::new(pool);
//!
//! // Run all pending migrations
//! let applied = migrator.run().await?;
//! println!("Applied {} migrations", applied);
//!
//! // Undo the newest one
//! migrator.revert(1).await?;
//! ```
//!
//! # Adding New Migrations
//!
//! 1. Create a new file `mXXX_description.rs` in this directory
//! 2. Implement the `Migration` trait
//! 3. Add the migration to the `MIGRATIONS` array in this file

mod m001_create_prompts_schema;
mod m002_reconcile_copy_totals;
mod m003_migrate_votes_to_likes;

pub use m001_create_prompts_schema::CreatePromptsSchema;
pub use m002_reconcile_copy_totals::ReconcileCopyTotals;
pub use m003_migrate_votes_to_likes::MigrateVotesToLikes;

use std::collections::HashSet;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Postgres, Row, Transaction};

/// All migrations in order. Add new migrations to the end.
const MIGRATIONS: &[&dyn Migration] = &[
    &CreatePromptsSchema,
    &ReconcileCopyTotals,
    &MigrateVotesToLikes,
];

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration's checksum doesn't match what was previously applied.
    #[error("Migration {version} ({name}) checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch {
        /// The version of the migration with mismatched checksum.
        version: i64,
        /// The name of the migration.
        name: String,
        /// The checksum that was expected (from the database).
        expected: String,
        /// The checksum that was found (from the code).
        found: String,
    },

    /// A migration failed to execute.
    #[error("Migration {version} ({name}) failed: {reason}")]
    MigrationFailed {
        /// The version of the migration that failed.
        version: i64,
        /// The name of the migration.
        name: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Reverting a migration failed.
    #[error("Reverting migration {version} ({name}) failed: {reason}")]
    RevertFailed {
        /// The version of the migration that failed to revert.
        version: i64,
        /// The name of the migration.
        name: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The migration cannot be reverted.
    #[error("Migration {version} ({name}) is irreversible")]
    Irreversible {
        /// The version of the irreversible migration.
        version: i64,
        /// The name of the migration.
        name: String,
    },

    /// The database records a migration this build does not know about.
    #[error("Migration {version} ({name}) is applied but unknown to this build")]
    UnknownMigration {
        /// The recorded version.
        version: i64,
        /// The recorded name.
        name: String,
    },
}

/// Represents a single database migration.
///
/// Migrations are defined as structs implementing this trait, allowing
/// both simple SQL execution and complex Rust logic when needed.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prompts_pg::migrations::{Migration, MigrationError};
/// use sqlx::{Postgres, Transaction};
///
/// pub struct MyMigration;
///
/// #[async_trait]
/// impl Migration for MyMigration {
///     fn version(&self) -> i64 { 42 }
///
///     fn name(&self) -> &'static str { "my_migration" }
///
///     async fn up<'a>(
///         &self,
///         tx: &mut Transaction<'a, Postgres>,
///     ) -> Result<(), MigrationError> {
///         sqlx::query("CREATE TABLE IF NOT EXISTS my_table (id INT)")
///             .execute(&mut **tx)
///             .await?;
///         Ok(())
///     }
///
///     async fn down<'a>(
///         &self,
///         tx: &mut Transaction<'a, Postgres>,
///     ) -> Result<(), MigrationError> {
///         sqlx::query("DROP TABLE IF EXISTS my_table")
///             .execute(&mut **tx)
///             .await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique version number (e.g., 1, 2, 3...).
    ///
    /// Must be unique across all migrations and should be sequential.
    fn version(&self) -> i64;

    /// Human-readable name (e.g., "create_prompts_schema").
    fn name(&self) -> &'static str;

    /// Execute the migration within the provided transaction.
    ///
    /// The transaction is managed by the Migrator - do not commit or rollback.
    /// Implementations must be safe to run against a schema that is already
    /// partially or fully in the target state.
    async fn up<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError>;

    /// Best-effort reversal of [`Migration::up`].
    ///
    /// Data repairs may implement this as a no-op, and reversals may be lossy.
    async fn down<'a>(&self, tx: &mut Transaction<'a, Postgres>) -> Result<(), MigrationError>;

    /// Whether [`Migrator::revert`] may undo this migration.
    ///
    /// Irreversible migrations are never passed to [`Migration::down`].
    fn reversible(&self) -> bool {
        true
    }

    /// Returns the checksum of this migration for tamper detection.
    ///
    /// Default implementation computes SHA-256 of version + name.
    /// Override if you want to include SQL content in the checksum.
    fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.version().to_le_bytes());
        hasher.update(self.name().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Record of a migration that has been applied.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    /// The version number of the migration.
    pub version: i64,
    /// The human-readable name of the migration.
    pub name: String,
    /// When the migration was applied.
    pub applied_at: chrono::DateTime<chrono::Utc>,
    /// The checksum recorded when the migration was applied.
    pub checksum: String,
}

/// Handles database migrations for prompts_pg.
///
/// The migrator tracks applied migrations in the `_prompts_migrations` table
/// and ensures migrations are applied in order, exactly once.
#[derive(Debug, Clone)]
pub struct Migrator {
    pool: PgPool,
}

impl Migrator {
    /// Creates a new migrator with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensures the migration tracking table exists.
    async fn ensure_tracking_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _prompts_migrations (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64) NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fails when a recorded migration no longer matches its definition.
    fn verify_checksums(applied: &[AppliedMigration]) -> Result<(), MigrationError> {
        for applied_migration in applied {
            if let Some(migration) = MIGRATIONS
                .iter()
                .find(|m| m.version() == applied_migration.version)
            {
                let current_checksum = migration.checksum();
                if current_checksum != applied_migration.checksum {
                    return Err(MigrationError::ChecksumMismatch {
                        version: applied_migration.version,
                        name: applied_migration.name.clone(),
                        expected: applied_migration.checksum.clone(),
                        found: current_checksum,
                    });
                }
            }
        }
        Ok(())
    }

    /// Runs all pending migrations.
    ///
    /// Each migration runs in its own transaction. If a migration fails,
    /// that transaction is rolled back but previously applied migrations
    /// remain committed.
    ///
    /// Returns the number of migrations applied.
    pub async fn run(&self) -> Result<usize, MigrationError> {
        self.run_to(i64::MAX).await
    }

    /// Runs pending migrations up to and including `target` version.
    ///
    /// Returns the number of migrations applied.
    pub async fn run_to(&self, target: i64) -> Result<usize, MigrationError> {
        self.ensure_tracking_table().await?;

        let applied = self.applied().await?;
        Self::verify_checksums(&applied)?;

        let applied_versions: HashSet<i64> = applied.iter().map(|m| m.version).collect();

        let mut count = 0;
        for migration in MIGRATIONS.iter().filter(|m| m.version() <= target) {
            if applied_versions.contains(&migration.version()) {
                log::debug!(
                    "Skipping migration {} ({}): already applied",
                    migration.version(),
                    migration.name()
                );
                continue;
            }

            log::info!(
                "Running migration {} ({})...",
                migration.version(),
                migration.name()
            );

            let mut tx = self.pool.begin().await?;

            migration.up(&mut tx).await.map_err(|e| match e {
                MigrationError::Database(db_err) => MigrationError::MigrationFailed {
                    version: migration.version(),
                    name: migration.name().to_string(),
                    reason: db_err.to_string(),
                },
                other => other,
            })?;

            sqlx::query(
                r#"
                INSERT INTO _prompts_migrations (version, name, checksum)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(migration.version())
            .bind(migration.name())
            .bind(migration.checksum())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            log::info!(
                "Migration {} ({}) applied successfully",
                migration.version(),
                migration.name()
            );
            count += 1;
        }

        Ok(count)
    }

    /// Reverts the newest `steps` applied migrations, newest first.
    ///
    /// Each reversal runs in its own transaction together with the removal
    /// of its tracking row. Every targeted migration must be known to this
    /// build and reversible before anything is reverted.
    ///
    /// Returns the number of migrations reverted.
    pub async fn revert(&self, steps: usize) -> Result<usize, MigrationError> {
        self.ensure_tracking_table().await?;

        let applied = self.applied().await?;
        Self::verify_checksums(&applied)?;

        let targets = applied
            .iter()
            .rev()
            .take(steps)
            .map(|applied_migration| {
                MIGRATIONS
                    .iter()
                    .copied()
                    .find(|m| m.version() == applied_migration.version)
                    .ok_or_else(|| MigrationError::UnknownMigration {
                        version: applied_migration.version,
                        name: applied_migration.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(migration) = targets.iter().find(|m| !m.reversible()) {
            return Err(MigrationError::Irreversible {
                version: migration.version(),
                name: migration.name().to_string(),
            });
        }

        let mut count = 0;
        for migration in targets {
            log::info!(
                "Reverting migration {} ({})...",
                migration.version(),
                migration.name()
            );

            let mut tx = self.pool.begin().await?;

            migration.down(&mut tx).await.map_err(|e| match e {
                MigrationError::Database(db_err) => MigrationError::RevertFailed {
                    version: migration.version(),
                    name: migration.name().to_string(),
                    reason: db_err.to_string(),
                },
                other => other,
            })?;

            sqlx::query("DELETE FROM _prompts_migrations WHERE version = $1")
                .bind(migration.version())
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            log::info!(
                "Migration {} ({}) reverted",
                migration.version(),
                migration.name()
            );
            count += 1;
        }

        Ok(count)
    }

    /// Returns the current migration version (0 if no migrations applied).
    pub async fn current_version(&self) -> Result<i64, MigrationError> {
        self.ensure_tracking_table().await?;

        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT version FROM _prompts_migrations
            ORDER BY version DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(v,)| v).unwrap_or(0))
    }

    /// Returns list of all pending migrations.
    pub async fn pending(&self) -> Result<Vec<&'static dyn Migration>, MigrationError> {
        self.ensure_tracking_table().await?;

        let applied_versions: HashSet<i64> =
            self.applied().await?.iter().map(|m| m.version).collect();

        Ok(MIGRATIONS
            .iter()
            .filter(|m| !applied_versions.contains(&m.version()))
            .copied()
            .collect())
    }

    /// Returns list of all applied migrations.
    pub async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        self.ensure_tracking_table().await?;

        let rows = sqlx::query(
            r#"
            SELECT version, name, applied_at, checksum
            FROM _prompts_migrations
            ORDER BY version ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<AppliedMigration, MigrationError> {
                Ok(AppliedMigration {
                    version: row.try_get("version")?,
                    name: row.try_get("name")?,
                    applied_at: row.try_get("applied_at")?,
                    checksum: row.try_get("checksum")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_checksum_is_deterministic() {
        let checksum1 = CreatePromptsSchema.checksum();
        let checksum2 = CreatePromptsSchema.checksum();
        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn different_migrations_have_different_checksums() {
        let checksum1 = ReconcileCopyTotals.checksum();
        let checksum2 = MigrateVotesToLikes.checksum();
        assert_ne!(checksum1, checksum2);
    }

    #[test]
    fn checksum_is_sha256_hex() {
        let checksum = MigrateVotesToLikes.checksum();
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn migrations_are_in_order() {
        let mut prev_version = 0;
        for migration in MIGRATIONS {
            assert!(
                migration.version() > prev_version,
                "Migration {} should have version > {}",
                migration.name(),
                prev_version
            );
            prev_version = migration.version();
        }
    }

    #[test]
    fn copy_reconciliation_runs_before_vote_migration() {
        assert!(ReconcileCopyTotals.version() > CreatePromptsSchema.version());
        assert!(MigrateVotesToLikes.version() > ReconcileCopyTotals.version());
    }

    #[test]
    fn only_the_baseline_schema_is_irreversible() {
        let irreversible: Vec<&str> = MIGRATIONS
            .iter()
            .filter(|m| !m.reversible())
            .map(|m| m.name())
            .collect();
        assert_eq!(irreversible, vec!["create_prompts_schema"]);
    }

    #[test]
    fn all_migrations_have_unique_names() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|m| m.name()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len(), "Migration names must be unique");
    }

    #[test]
    fn checksum_mismatch_is_detected() {
        let applied = vec![AppliedMigration {
            version: ReconcileCopyTotals.version(),
            name: ReconcileCopyTotals.name().to_string(),
            applied_at: chrono::Utc::now(),
            checksum: "tampered".to_string(),
        }];
        let err = Migrator::verify_checksums(&applied).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::ChecksumMismatch { version: 2, .. }
        ));
    }

    #[test]
    fn unknown_recorded_versions_do_not_fail_checksum_verification() {
        let applied = vec![AppliedMigration {
            version: 999,
            name: "from_a_newer_build".to_string(),
            applied_at: chrono::Utc::now(),
            checksum: "whatever".to_string(),
        }];
        assert!(Migrator::verify_checksums(&applied).is_ok());
    }
}
