use anyhow::anyhow;
use aws_config::Region;
use aws_sdk_iam::config::Credentials;
use aws_sdk_iam::Client as IamClient;
use tracing::{debug, info};

use crate::config::AwsSourceConfig;
use crate::error::ProviderError;
use crate::key_info::KeyInfo;
use crate::sources::source::CredentialSource;

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Which credential the source currently holds besides the original.
enum MintState {
    Idle,
    Minted {
        access_key_id: String,
        secret_access_key: String,
    },
    Retired,
}

/// Credential source that rotates an IAM user's access key pair.
///
/// Mint and revert authenticate with the original pair; commit authenticates
/// with the freshly minted pair, since the original is the one being deleted.
pub struct AwsIamSource {
    user: String,
    region: String,
    original_access_key_id: String,
    original_secret_access_key: String,
    state: MintState,
}

impl AwsIamSource {
    /// Create a source for one rotation attempt of the configured IAM user.
    pub fn new(config: &AwsSourceConfig) -> Self {
        Self {
            user: config.user.clone(),
            region: config.region.clone(),
            original_access_key_id: config.access_key_id.clone(),
            original_secret_access_key: config.secret_access_key.clone(),
            state: MintState::Idle,
        }
    }

    /// Build an IAM client authenticated with the given key pair.
    async fn client(&self, access_key_id: &str, secret_access_key: &str) -> IamClient {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "access-key-rotator",
        );
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;
        IamClient::new(&config)
    }
}

#[async_trait::async_trait]
impl CredentialSource for AwsIamSource {
    fn original_key_infos(&self) -> Vec<KeyInfo> {
        vec![
            KeyInfo::new(ACCESS_KEY_ID, self.original_access_key_id.clone()),
            KeyInfo::new(SECRET_ACCESS_KEY, self.original_secret_access_key.clone()),
        ]
    }

    async fn mint(&mut self) -> Result<Vec<KeyInfo>, ProviderError> {
        assert!(
            matches!(self.state, MintState::Idle),
            "mint() called more than once on an AwsIamSource"
        );

        info!("Creating a new access key for IAM user '{}'", self.user);
        let client = self
            .client(&self.original_access_key_id, &self.original_secret_access_key)
            .await;

        let response = client
            .create_access_key()
            .user_name(&self.user)
            .send()
            .await
            .map_err(|e| ProviderError::new("create access key", e))?;

        let access_key = response.access_key.ok_or_else(|| {
            ProviderError::new(
                "create access key",
                anyhow!("IAM response did not include an access key"),
            )
        })?;
        debug!("Created access key {}", access_key.access_key_id);

        let key_infos = vec![
            KeyInfo::new(ACCESS_KEY_ID, access_key.access_key_id.clone()),
            KeyInfo::new(SECRET_ACCESS_KEY, access_key.secret_access_key.clone()),
        ];
        self.state = MintState::Minted {
            access_key_id: access_key.access_key_id,
            secret_access_key: access_key.secret_access_key,
        };
        Ok(key_infos)
    }

    async fn revert(&mut self) -> Result<(), ProviderError> {
        // Retain the original key; the pending one is the one being retired.
        let pending_id = match &self.state {
            MintState::Minted { access_key_id, .. } => access_key_id.clone(),
            MintState::Idle | MintState::Retired => return Ok(()),
        };

        info!(
            "Deleting pending access key {} for IAM user '{}'",
            pending_id, self.user
        );
        let client = self
            .client(&self.original_access_key_id, &self.original_secret_access_key)
            .await;

        client
            .delete_access_key()
            .user_name(&self.user)
            .access_key_id(&pending_id)
            .send()
            .await
            .map_err(|e| ProviderError::new("delete access key", e))?;

        self.state = MintState::Retired;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), ProviderError> {
        // Retain the pending key; the original is the one being retired.
        let (pending_id, pending_secret) = match &self.state {
            MintState::Minted {
                access_key_id,
                secret_access_key,
            } => (access_key_id.clone(), secret_access_key.clone()),
            MintState::Idle | MintState::Retired => {
                panic!("commit() called without a successful mint()")
            }
        };

        info!(
            "Deleting original access key {} for IAM user '{}'",
            self.original_access_key_id, self.user
        );
        let client = self.client(&pending_id, &pending_secret).await;

        client
            .delete_access_key()
            .user_name(&self.user)
            .access_key_id(&self.original_access_key_id)
            .send()
            .await
            .map_err(|e| ProviderError::new("delete access key", e))?;

        self.state = MintState::Retired;
        Ok(())
    }

    fn source_type(&self) -> &'static str {
        "aws-iam"
    }
}
