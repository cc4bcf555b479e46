//! GridCI CLI tool.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gridci")]
#[command(about = "Expand CI build matrices into Docker build contexts", long_about = None)]
struct Cli {
    /// Directory prepared build contexts are written under
    #[arg(long, env = "GRIDCI_BUILD_ROOT", default_value = ".gridci/builds")]
    build_root: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the builds a project's CI configuration expands to
    Builds {
        /// Project directory
        #[arg(default_value = ".")]
        path: String,
    },
    /// Prepare build contexts (mirrored source + generated Dockerfile)
    Prepare {
        /// Project directory
        #[arg(default_value = ".")]
        path: String,
        /// Only prepare the build whose key starts with this prefix
        #[arg(long)]
        build: Option<String>,
    },
    /// Check that the CI configuration parses and report the matrix size
    Validate {
        /// Project directory
        #[arg(default_value = ".")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Builds { path } => {
            commands::builds(&cli.build_root, &path).await?;
        }
        Commands::Prepare { path, build } => {
            commands::prepare(&cli.build_root, &path, build).await?;
        }
        Commands::Validate { path } => {
            commands::validate(&cli.build_root, &path).await?;
        }
    }

    Ok(())
}
