use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::VaultTargetConfig;
use crate::error::TargetError;
use crate::key_info::KeyInfo;
use crate::targets::target::TargetSink;

/// Target that stores the credential in a HashiCorp Vault KV v2 path.
///
/// Apply and revert are the same write with different values: writing a full
/// key set to the path is an absolute restoration, so reverting works even
/// when apply never ran.
pub struct VaultTarget {
    client: Client,
    address: String,
    token: String,
    mount: String,
    path: String,
}

impl VaultTarget {
    /// Create a new VaultTarget
    pub fn new(config: &VaultTargetConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            address: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            mount: config.mount.clone(),
            path: config.path.clone(),
        })
    }

    /// Write the given key set to the configured KV v2 path.
    async fn write(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError> {
        let url = format!("{}/v1/{}/data/{}", self.address, self.mount, self.path);
        debug!("Writing {} key(s) to {}", key_infos.len(), url);

        let data: HashMap<&str, &str> = key_infos
            .iter()
            .map(|k| (k.name.as_str(), k.value.as_str()))
            .collect();

        let response = self
            .client
            .post(&url)
            .header("X-Vault-Token", &self.token)
            .json(&json!({ "data": data }))
            .send()
            .await
            .map_err(TargetError::new)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TargetError::new(anyhow!(
                "Vault request failed with status {}: {}",
                status,
                body
            )));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl TargetSink for VaultTarget {
    async fn apply(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError> {
        info!("Writing new credential to {}", self.name());
        self.write(key_infos).await
    }

    async fn revert_to(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError> {
        info!("Restoring original credential in {}", self.name());
        self.write(key_infos).await
    }

    fn target_type(&self) -> &'static str {
        "vault"
    }

    fn name(&self) -> String {
        format!("vault:{}/{}", self.mount, self.path)
    }
}
