pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::commands::{cmd_bootstrap, cmd_grant_credits, cmd_rename, cmd_set_plan, cmd_show_profile};
use cli::{Cli, Commands};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bootstrap {
            id,
            email,
            name,
            no_retry,
        } => cmd_bootstrap(&config, &id, email, name, no_retry).await,

        Commands::Show { id } => cmd_show_profile(&config, &id).await,

        Commands::SetPlan { id, plan, days } => cmd_set_plan(&config, &id, plan, days).await,

        Commands::Grant { id, find, verify } => cmd_grant_credits(&config, &id, find, verify).await,

        Commands::Rename { id, full_name } => cmd_rename(&config, &id, &full_name).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }
    }
}
