use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "shardmig",
    about = "shardmig: migration routing over sharded clusters",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Topology file describing clusters, shards and sequence shards
    #[arg(short, long, global = true, default_value = "topology.toml")]
    topology: String,
    /// Migration manifest declaring each migration's scope
    #[arg(short, long, global = true, default_value = "migrations.toml")]
    migrations: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every migration scope resolves against the topology
    Validate,
    /// List the connections each migration is applied to
    Targets {
        /// Only this migration (name or version)
        #[arg(long)]
        migration: Option<String>,
    },
    /// Show every execution pass and its decision.
    ///
    /// The master pass comes first, then one pass per target connection.
    Plan {
        /// Only this migration (name or version)
        #[arg(long)]
        migration: Option<String>,
        /// Shard pass on which master-only migrations go through the router
        #[arg(long)]
        master_slot: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shardmig=info".parse()?)
        )
        .init();

    let cli = Cli::parse();
    let files = commands::Files::new(&cli.topology, &cli.migrations);

    match cli.command {
        Commands::Validate => commands::inspect::validate(&files),
        Commands::Targets { migration } => {
            commands::inspect::targets(&files, migration.as_deref())
        }
        Commands::Plan { migration, master_slot, format } => {
            commands::plan::plan(&files, migration.as_deref(), master_slot, &format)
        }
    }
}
