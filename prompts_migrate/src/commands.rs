use anyhow::{Context, Result, bail};
use prompts_core::PromptStore;
use prompts_pg::{Migrator, PgPromptStore};
use sqlx::postgres::PgPoolOptions;

use crate::cli::{Cli, Commands};

pub async fn run(cli: Cli) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(cli.max_connections)
        .connect(&cli.database_url)
        .await
        .context("failed to connect to the database")?;
    let migrator = Migrator::new(pool.clone());

    match cli.command {
        Commands::Up { target } => {
            let applied = match target {
                Some(target) => migrator.run_to(target).await?,
                None => migrator.run().await?,
            };
            println!(
                "Applied {} migrations, now at version {}",
                applied,
                migrator.current_version().await?
            );
        }
        Commands::Down { steps } => {
            let reverted = migrator.revert(steps).await?;
            println!(
                "Reverted {} migrations, now at version {}",
                reverted,
                migrator.current_version().await?
            );
        }
        Commands::Status => {
            for applied in migrator.applied().await? {
                println!(
                    "applied  {:>4}  {:<32} {}",
                    applied.version,
                    applied.name,
                    applied.applied_at.to_rfc3339()
                );
            }
            for pending in migrator.pending().await? {
                println!("pending  {:>4}  {}", pending.version(), pending.name());
            }
        }
        Commands::Reconcile => {
            let store = PgPromptStore::new(pool);
            let copies = store.reconcile_copy_totals().await?;
            let likes = store.recompute_likes().await?;
            println!("{}", reconcile_summary(copies, likes));
        }
        Commands::Drift => {
            let store = PgPromptStore::new(pool);
            let drift = store.counter_drift().await?;
            for entry in &drift {
                println!("{entry}");
            }
            if !drift.is_empty() {
                bail!("{} prompts have drifted counters", drift.len());
            }
            println!("All prompt counters are in sync");
        }
    }

    Ok(())
}

fn reconcile_summary(copies: u64, likes: u64) -> String {
    format!("Recomputed totalCopies of {copies} prompts and likes of {likes} prompts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_summary_reports_both_counters() {
        assert_eq!(
            reconcile_summary(4, 3),
            "Recomputed totalCopies of 4 prompts and likes of 3 prompts"
        );
    }
}
