use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsSourceConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
}

/// The IAM user whose access key pair gets rotated, plus the original pair
/// used to authenticate the rotation itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSourceConfig {
    pub user: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    pub vault: Option<VaultTargetConfig>,
    pub env_file: Option<EnvFileTargetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultTargetConfig {
    pub address: String,
    pub token: String,
    #[serde(default = "default_mount")]
    pub mount: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvFileTargetConfig {
    pub path: PathBuf,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_mount() -> String {
    "secret".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let aws = AwsSourceConfig {
            user: std::env::var("ROTATOR_IAM_USER")
                .context("ROTATOR_IAM_USER environment variable not set")?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| default_region()),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID")
                .context("AWS_ACCESS_KEY_ID environment variable not set")?,
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY")
                .context("AWS_SECRET_ACCESS_KEY environment variable not set")?,
        };

        let vault = match std::env::var("VAULT_ADDR") {
            Ok(address) => Some(VaultTargetConfig {
                address,
                token: std::env::var("VAULT_TOKEN")
                    .context("VAULT_TOKEN environment variable not set")?,
                mount: std::env::var("VAULT_MOUNT").unwrap_or_else(|_| default_mount()),
                path: std::env::var("VAULT_PATH")
                    .context("VAULT_PATH environment variable not set")?,
            }),
            Err(_) => None,
        };

        let env_file = std::env::var("ROTATOR_ENV_FILE")
            .ok()
            .map(|path| EnvFileTargetConfig { path: path.into() });

        Ok(Self {
            aws,
            targets: TargetsConfig { vault, env_file },
        })
    }

    /// Create a sample configuration file
    pub fn create_sample<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample = Self {
            aws: AwsSourceConfig {
                user: "ci-deployer".to_string(),
                region: default_region(),
                access_key_id: "AKIA...".to_string(),
                secret_access_key: "your-secret-access-key-here".to_string(),
            },
            targets: TargetsConfig {
                vault: Some(VaultTargetConfig {
                    address: "http://127.0.0.1:8200".to_string(),
                    token: "your-vault-token-here".to_string(),
                    mount: default_mount(),
                    path: "ci/aws".to_string(),
                }),
                env_file: Some(EnvFileTargetConfig {
                    path: PathBuf::from("/etc/ci/aws.env"),
                }),
            },
        };

        let toml_string =
            toml::to_string_pretty(&sample).context("Failed to serialize sample config")?;
        fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write sample config to {:?}", path.as_ref()))?;

        Ok(())
    }
}
