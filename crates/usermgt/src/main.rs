mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use usermgt_cloud::CloudError;
use usermgt_config::ProviderConfig;
use usermgt_fastly::FastlyProvider;

#[derive(Parser)]
#[command(name = "usermgt")]
#[command(about = "Declarative Fastly user and invitation management", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding .usermgt/state.json
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every user of the account
    Users {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List pending invitations
    Invitations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show who the API key belongs to
    Whoami,
    /// Show the resolved configuration
    Config,
    /// Manage fastly_user resources
    #[command(subcommand)]
    User(UserCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Invite a user, or adopt an existing user or invitation
    Create {
        /// Local resource name
        resource: String,
        /// Email address (login)
        #[arg(long)]
        login: String,
        /// Real life name
        #[arg(long)]
        name: String,
        /// user, billing, engineer or superuser
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Refresh a resource, detecting accepted invitations
    Read {
        resource: String,
    },
    /// Change name or role of an accepted user
    Update {
        resource: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete the user, or revoke the pending invitation
    Delete {
        resource: String,
    },
    /// Start managing an existing user or invitation by id
    Import {
        resource: String,
        id: String,
    },
    /// List managed resources from local state
    List,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Commands that need neither credentials nor the API
    match &cli.command {
        Commands::Version => {
            println!("usermgt {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Config => {
            let config = ProviderConfig::load().context("failed to load configuration")?;
            commands::config::handle(&config);
            return Ok(());
        }
        Commands::User(UserCommands::List) => {
            return commands::user::handle_list(&cli.dir).await;
        }
        _ => {}
    }

    let config = ProviderConfig::load().context("failed to load configuration")?;
    let provider = FastlyProvider::new(&config)?;

    tokio::select! {
        result = run(cli.command, &cli.dir, &provider) => result,
        _ = tokio::signal::ctrl_c() => Err(CloudError::Cancelled.into()),
    }
}

async fn run(
    command: Commands,
    dir: &std::path::Path,
    provider: &FastlyProvider,
) -> anyhow::Result<()> {
    match command {
        Commands::Users { json } => commands::users::handle(provider, json).await,
        Commands::Invitations { json } => commands::invitations::handle(provider, json).await,
        Commands::Whoami => commands::whoami::handle(provider).await,
        Commands::User(cmd) => commands::user::handle(provider, dir, cmd).await,
        Commands::Version | Commands::Config => Ok(()),
    }
}
