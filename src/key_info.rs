use std::fmt;

use crate::error::ConfigurationError;

/// A single named secret value, e.g. `AWS_ACCESS_KEY_ID` and its key id.
///
/// A credential is carried around as a sequence of these; order only matters
/// for display, names are unique within one sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: String,
    pub value: String,
}

impl KeyInfo {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// Secret values must never end up in logs or panic messages.
impl fmt::Debug for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyInfo")
            .field("name", &self.name)
            .field("value", &"***")
            .finish()
    }
}

/// Check that every name in a credential set is unique.
pub fn validate_unique_names(key_infos: &[KeyInfo]) -> Result<(), ConfigurationError> {
    for (i, key) in key_infos.iter().enumerate() {
        if key_infos[..i].iter().any(|k| k.name == key.name) {
            return Err(ConfigurationError::DuplicateKeyName(key.name.clone()));
        }
    }
    Ok(())
}

/// Names of a credential set, for log output.
pub fn names(key_infos: &[KeyInfo]) -> Vec<&str> {
    key_infos.iter().map(|k| k.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_name_and_value() {
        let a = KeyInfo::new("AWS_ACCESS_KEY_ID", "AKIA_OLD");
        let b = KeyInfo::new("AWS_ACCESS_KEY_ID", "AKIA_OLD");
        let c = KeyInfo::new("AWS_ACCESS_KEY_ID", "AKIA_NEW");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_redacts_value() {
        let key = KeyInfo::new("AWS_SECRET_ACCESS_KEY", "secretOLD");
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("AWS_SECRET_ACCESS_KEY"));
        assert!(!rendered.contains("secretOLD"));
    }

    #[test]
    fn test_validate_unique_names() {
        let keys = vec![
            KeyInfo::new("AWS_ACCESS_KEY_ID", "a"),
            KeyInfo::new("AWS_SECRET_ACCESS_KEY", "b"),
        ];
        assert!(validate_unique_names(&keys).is_ok());

        let dup = vec![
            KeyInfo::new("AWS_ACCESS_KEY_ID", "a"),
            KeyInfo::new("AWS_ACCESS_KEY_ID", "b"),
        ];
        match validate_unique_names(&dup) {
            Err(ConfigurationError::DuplicateKeyName(name)) => {
                assert_eq!(name, "AWS_ACCESS_KEY_ID")
            }
            other => panic!("expected duplicate name error, got {:?}", other),
        }
    }
}
