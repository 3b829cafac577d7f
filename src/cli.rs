//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and routes commands to the appropriate handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::Config;
use crate::rotation::{self, RollbackReason, RunOutcome};
use crate::sources::AwsIamSource;
use crate::targets::{EnvFileTarget, TargetInstance, TargetSink, VaultTarget};

#[derive(Parser)]
#[command(name = "akr")]
#[command(about = "Rotates a cloud access key pair across downstream consumers, rolling back on failure", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ROTATOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a sample configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "rotator-config.toml")]
        output: PathBuf,
    },

    /// Run one rotation: mint a new key, distribute it, commit or roll back
    Rotate {
        /// Only print what would be rotated
        #[arg(long)]
        dry_run: bool,
    },
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    // Handle init command separately as it doesn't need configuration
    if let Commands::Init { output } = cli.command {
        Config::create_sample(&output)
            .with_context(|| format!("Failed to create sample config at {:?}", output))?;
        info!("Sample configuration created at {:?}", output);
        return Ok(());
    }

    // Load configuration
    let config = if let Some(config_path) = cli.config {
        Config::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        Config::from_env().context("Failed to load config from environment")?
    };

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above
        Commands::Rotate { dry_run } => rotate(&config, dry_run).await,
    }
}

async fn rotate(config: &Config, dry_run: bool) -> Result<()> {
    let mut source = AwsIamSource::new(&config.aws);
    let targets = create_targets(config)?;

    if dry_run {
        println!(
            "[DRY RUN] Would rotate the access key pair of IAM user '{}'",
            config.aws.user
        );
        if targets.is_empty() {
            println!("[DRY RUN] No targets configured; the run would roll back immediately");
        }
        for target in &targets {
            println!("[DRY RUN] Would distribute the new credential to {}", target.name());
        }
        return Ok(());
    }

    match rotation::run(&mut source, &targets).await {
        Ok(RunOutcome::Committed) => {
            println!(
                "✓ Rotation committed; {} target(s) now hold the new credential",
                targets.len()
            );
            Ok(())
        }
        Ok(RunOutcome::RolledBack(reason)) => {
            match &reason {
                RollbackReason::Misconfigured(e) => {
                    eprintln!("✗ Rolled back: {}", e);
                }
                RollbackReason::TargetFailures(failures) => {
                    eprintln!("✗ Rolled back; the original credential remains live everywhere:");
                    for failure in failures {
                        eprintln!("  - {}", failure);
                    }
                }
            }
            anyhow::bail!("rotation rolled back")
        }
        Ok(RunOutcome::Failed(e)) => {
            Err(anyhow::Error::new(e).context("rotation failed before anything was distributed"))
        }
        Err(inconsistent) => {
            error!("{}", inconsistent);
            eprintln!("✗ MANUAL INTERVENTION REQUIRED: {}", inconsistent);
            Err(anyhow::Error::new(inconsistent))
        }
    }
}

/// Build the target list from configuration
fn create_targets(config: &Config) -> Result<Vec<TargetInstance>> {
    let mut targets: Vec<TargetInstance> = Vec::new();

    if let Some(ref vault_config) = config.targets.vault {
        targets.push(Box::new(
            VaultTarget::new(vault_config).context("Failed to create Vault target")?,
        ));
    }

    if let Some(ref env_file_config) = config.targets.env_file {
        targets.push(Box::new(EnvFileTarget::new(env_file_config)));
    }

    Ok(targets)
}
