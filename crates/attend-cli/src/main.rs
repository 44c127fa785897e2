mod attendance;
mod position;

use attend_client::Direction;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use position::PositionArgs;

#[derive(Debug, Parser)]
#[command(name = "attend")]
#[command(about = "Geofenced attendance check-in from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List branches with their geofence radius
    Branches,
    /// Show today's attendance record
    Today,
    /// Resolve the nearest branch to a position
    Nearest {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Run location acquisition and print each state change
    Locate {
        #[command(flatten)]
        position: PositionArgs,
        /// Keep tracking for this many seconds after the first fix
        #[arg(long, default_value = "0")]
        track_secs: u64,
    },
    /// Check in at the nearest branch
    CheckIn {
        #[command(flatten)]
        position: PositionArgs,
        /// Print the admission decision without submitting
        #[arg(long)]
        dry_run: bool,
    },
    /// Check out at the nearest branch
    CheckOut {
        #[command(flatten)]
        position: PositionArgs,
        /// Print the admission decision without submitting
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("attend: no command given; see `attend --help`");
        return Ok(());
    };

    let config = attend_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    match command {
        Commands::Branches => attendance::run_branches(&config).await,
        Commands::Today => attendance::run_today(&config).await,
        Commands::Nearest { position } => attendance::run_nearest(&config, &position).await,
        Commands::Locate {
            position,
            track_secs,
        } => position::run_locate(&config.locator, &position, track_secs).await,
        Commands::CheckIn { position, dry_run } => {
            attendance::run_check(&config, &position, Direction::CheckIn, dry_run).await
        }
        Commands::CheckOut { position, dry_run } => {
            attendance::run_check(&config, &position, Direction::CheckOut, dry_run).await
        }
    }
}
