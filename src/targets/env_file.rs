use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::EnvFileTargetConfig;
use crate::error::TargetError;
use crate::key_info::KeyInfo;
use crate::targets::target::TargetSink;

/// Target that writes the credential as `export NAME="value"` lines into a
/// shell environment file, updating lines in place or appending.
///
/// Writing a value set is an absolute restoration, so reverting is the same
/// operation with the original values and is safe when apply never ran, even
/// against a file that does not exist yet.
pub struct EnvFileTarget {
    path: PathBuf,
}

impl EnvFileTarget {
    /// Create a new EnvFileTarget
    pub fn new(config: &EnvFileTargetConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    fn write_all(&self, key_infos: &[KeyInfo]) -> Result<()> {
        let mut content = if self.path.exists() {
            fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read {}", self.path.display()))?
        } else {
            debug!("{} does not exist yet, creating it", self.path.display());
            String::new()
        };

        for key in key_infos {
            content = upsert_export(&content, &key.name, &key.value);
        }

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;

        Ok(())
    }
}

/// Replace an existing `NAME=` or `export NAME=` line, or append a new one.
fn upsert_export(content: &str, name: &str, value: &str) -> String {
    let export_line = format!("export {}=\"{}\"", name, value);
    let export_prefix = format!("export {}=", name);
    let plain_prefix = format!("{}=", name);

    let mut found = false;
    let mut new_content = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(&export_prefix) || trimmed.starts_with(&plain_prefix) {
            new_content.push_str(&export_line);
            new_content.push('\n');
            found = true;
        } else {
            new_content.push_str(line);
            new_content.push('\n');
        }
    }

    if !found {
        new_content.push_str(&export_line);
        new_content.push('\n');
    }

    new_content
}

#[async_trait::async_trait]
impl TargetSink for EnvFileTarget {
    async fn apply(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError> {
        info!(
            "Writing {} variable(s) to {}",
            key_infos.len(),
            self.path.display()
        );
        self.write_all(key_infos).map_err(TargetError::new)
    }

    async fn revert_to(&self, key_infos: &[KeyInfo]) -> Result<(), TargetError> {
        info!(
            "Restoring {} variable(s) in {}",
            key_infos.len(),
            self.path.display()
        );
        self.write_all(key_infos).map_err(TargetError::new)
    }

    fn target_type(&self) -> &'static str {
        "env-file"
    }

    fn name(&self) -> String {
        format!("env-file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn target_in(dir: &TempDir) -> EnvFileTarget {
        EnvFileTarget::new(&EnvFileTargetConfig {
            path: dir.path().join("ci.env"),
        })
    }

    fn keys(id: &str, secret: &str) -> Vec<KeyInfo> {
        vec![
            KeyInfo::new("AWS_ACCESS_KEY_ID", id),
            KeyInfo::new("AWS_SECRET_ACCESS_KEY", secret),
        ]
    }

    #[tokio::test]
    async fn test_apply_updates_existing_and_appends_missing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("ci.env");
        fs::write(&path, "# ci environment\nexport AWS_ACCESS_KEY_ID=\"AKIA_OLD\"\n")?;

        let target = target_in(&dir);
        target.apply(&keys("AKIA_NEW", "secretNEW")).await?;

        let content = fs::read_to_string(&path)?;
        assert!(content.contains("# ci environment"));
        assert!(content.contains("export AWS_ACCESS_KEY_ID=\"AKIA_NEW\""));
        assert!(content.contains("export AWS_SECRET_ACCESS_KEY=\"secretNEW\""));
        assert!(!content.contains("AKIA_OLD"));

        Ok(())
    }

    #[tokio::test]
    async fn test_revert_to_restores_original_values() -> Result<()> {
        let dir = TempDir::new()?;
        let target = target_in(&dir);

        target.apply(&keys("AKIA_NEW", "secretNEW")).await?;
        target.revert_to(&keys("AKIA_OLD", "secretOLD")).await?;

        let content = fs::read_to_string(dir.path().join("ci.env"))?;
        assert!(content.contains("export AWS_ACCESS_KEY_ID=\"AKIA_OLD\""));
        assert!(!content.contains("AKIA_NEW"));

        Ok(())
    }

    #[tokio::test]
    async fn test_revert_to_without_prior_apply_succeeds() -> Result<()> {
        let dir = TempDir::new()?;
        let target = target_in(&dir);

        // A sibling target failed before this one ever applied; restoration
        // must still work, including against a missing file.
        target.revert_to(&keys("AKIA_OLD", "secretOLD")).await?;

        let content = fs::read_to_string(dir.path().join("ci.env"))?;
        assert!(content.contains("export AWS_ACCESS_KEY_ID=\"AKIA_OLD\""));

        Ok(())
    }

    #[test]
    fn test_upsert_matches_plain_assignments_too() {
        let content = "AWS_ACCESS_KEY_ID=AKIA_OLD\n";
        let updated = upsert_export(content, "AWS_ACCESS_KEY_ID", "AKIA_NEW");
        assert_eq!(updated, "export AWS_ACCESS_KEY_ID=\"AKIA_NEW\"\n");
    }
}
