//! # LATS POS Agent
//!
//! Command-line entry point to the service layer.
//!
//! ```text
//! pos-agent [--config lats.toml] switch-branch --id dar --name "Dar es Salaam"
//! pos-agent preload --branch dar
//! pos-agent whatsapp-state
//! pos-agent send --channel sms --to 255712345678 --message "Receipt #42"
//! ```

mod services;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lats_core::IntegrationKind;
use lats_sync::LatsConfig;

use crate::services::Services;

#[derive(Parser, Debug)]
#[command(author, version, about = "LATS POS service agent", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to lats.toml. Without it the platform config directory is
    /// tried, falling back to defaults if that file cannot be loaded.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Switch the active branch and reload every branch-scoped store
    SwitchBranch {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Preload IMEI child variants for a branch's products
    Preload {
        /// Branch id (defaults to the configured branch)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Show the Green API instance state
    WhatsappState,
    /// Send one message through a configured integration
    Send {
        #[arg(long, value_enum)]
        channel: Channel,
        #[arg(long)]
        to: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Channel {
    Whatsapp,
    Sms,
    Email,
}

impl From<Channel> for IntegrationKind {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Whatsapp => IntegrationKind::WhatsappGreenApi,
            Channel::Sms => IntegrationKind::SmsGateway,
            Channel::Email => IntegrationKind::Email,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.clone() {
        Some(path) => LatsConfig::load(Some(path))?,
        None => LatsConfig::load_or_default(None),
    };
    info!(branch = %config.branch.id, "Configuration loaded");

    let services = Services::start(config).await?;
    let result = run(&services, cli.command).await;
    services.shutdown().await;
    result
}

async fn run(services: &Services, command: Command) -> Result<()> {
    match command {
        Command::SwitchBranch { id, name } => {
            let report = services.orchestrator.sync_branch(&id, &name).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Preload { branch } => {
            let branch = branch.unwrap_or_else(|| services.config.branch.id.clone());
            let parent_ids = services.db.variants().parent_ids_for_branch(&branch).await?;
            let outcome = services.variant_cache.preload(&parent_ids).await?;
            info!(branch = %branch, outcome = ?outcome, "Preload finished");

            let counts = services.variant_cache.counts(&parent_ids);
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }

        Command::WhatsappState => match services.green_api().await? {
            Ok(client) => {
                let state = client.get_state_instance().await?;
                println!("{}", state.state_instance);
            }
            Err(e) => {
                warn!(error = %e, "WhatsApp unavailable");
                println!("{}", e);
            }
        },

        Command::Send {
            channel,
            to,
            message,
        } => {
            let outcome = services
                .messenger()
                .await?
                .send(channel.into(), &to, &message)
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_branch_args() {
        let cli = Cli::try_parse_from([
            "pos-agent",
            "switch-branch",
            "--id",
            "dar",
            "--name",
            "Dar es Salaam",
            "--config",
            "/tmp/lats.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lats.toml")));
        assert_eq!(
            cli.command,
            Command::SwitchBranch {
                id: "dar".into(),
                name: "Dar es Salaam".into()
            }
        );
    }

    #[test]
    fn test_preload_branch_is_optional() {
        let cli = Cli::try_parse_from(["pos-agent", "preload"]).unwrap();
        assert_eq!(cli.command, Command::Preload { branch: None });
        assert!(Cli::try_parse_from(["pos-agent", "switch-branch", "--id", "dar"]).is_err());
    }

    #[test]
    fn test_send_channel_maps_to_integration() {
        let cli = Cli::try_parse_from([
            "pos-agent", "send", "--channel", "sms", "--to", "255712345678", "--message", "hi",
        ])
        .unwrap();

        match cli.command {
            Command::Send { channel, .. } => {
                assert_eq!(IntegrationKind::from(channel), IntegrationKind::SmsGateway)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
