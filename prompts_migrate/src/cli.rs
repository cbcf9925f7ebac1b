use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "prompts-migrate")]
#[command(about = "Apply, revert and audit the R1 Prompts database migrations", long_about = None)]
pub struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled connections
    #[arg(long, default_value_t = 5)]
    pub max_connections: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration
    Up {
        /// Stop after this version
        #[arg(long)]
        target: Option<i64>,
    },

    /// Revert the newest applied migrations
    Down {
        /// How many migrations to revert
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },

    /// List applied and pending migrations
    Status,

    /// Recompute totalCopies and likes from the event tables
    Reconcile,

    /// Report prompts whose counters disagree with the event tables
    Drift,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_down_with_default_steps() {
        let cli = Cli::parse_from(["prompts-migrate", "--database-url", "postgres://x", "down"]);
        assert!(matches!(cli.command, Commands::Down { steps: 1 }));
        assert_eq!(cli.max_connections, 5);
    }

    #[test]
    fn parses_up_with_target() {
        let cli = Cli::parse_from([
            "prompts-migrate",
            "--database-url",
            "postgres://x",
            "up",
            "--target",
            "2",
        ]);
        assert!(matches!(cli.command, Commands::Up { target: Some(2) }));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
