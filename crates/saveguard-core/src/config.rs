//! Recovery configuration
//!
//! All fixed names the component depends on (storage key, private scheme,
//! context flag, documentation link) live here so hosts can rename them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default storage key of the "don't show the conflict hint" flag
pub const DEFAULT_SUPPRESSION_KEY: &str = "saveConflict.hintSuppressed";

/// Default private scheme for on-disk snapshots
pub const DEFAULT_CONFLICT_SCHEME: &str = "conflictResolution";

/// Default context flag set while a comparison view is focused
pub const DEFAULT_CONTEXT_KEY: &str = "saveConflictResolutionContext";

/// Default documentation link for save conflicts
pub const DEFAULT_LEARN_MORE_URL: &str = "https://go.microsoft.com/fwlink/?linkid=868264";

/// Recovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Storage key of the suppression flag
    pub suppression_key: String,
    /// Scheme of on-disk snapshot resources
    pub conflict_scheme: String,
    /// Context flag kept in sync with the conflict view
    pub context_key: String,
    /// Link opened by "Learn More"
    pub learn_more_url: String,
    /// Application name shown in comparison labels
    pub product_name: String,
}

impl RecoveryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With conflict scheme
    #[inline]
    #[must_use]
    pub fn with_conflict_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.conflict_scheme = scheme.into();
        self
    }

    /// With suppression key
    #[inline]
    #[must_use]
    pub fn with_suppression_key(mut self, key: impl Into<String>) -> Self {
        self.suppression_key = key.into();
        self
    }

    /// With product name
    #[inline]
    #[must_use]
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// With documentation link
    #[inline]
    #[must_use]
    pub fn with_learn_more_url(mut self, url: impl Into<String>) -> Self {
        self.learn_more_url = url.into();
        self
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` if a name is empty or the scheme is `file`
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Check invariants
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("suppression_key", &self.suppression_key),
            ("conflict_scheme", &self.conflict_scheme),
            ("context_key", &self.context_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if self.conflict_scheme == saveguard_host::FILE_SCHEME {
            return Err(ConfigError::Invalid(
                "conflict_scheme must differ from the file scheme".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            suppression_key: DEFAULT_SUPPRESSION_KEY.to_string(),
            conflict_scheme: DEFAULT_CONFLICT_SCHEME.to_string(),
            context_key: DEFAULT_CONTEXT_KEY.to_string(),
            learn_more_url: DEFAULT_LEARN_MORE_URL.to_string(),
            product_name: "Editor".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File read failed
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantically invalid value
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn config_defaults() {
        let config = RecoveryConfig::new();
        assert_eq!(config.conflict_scheme, DEFAULT_CONFLICT_SCHEME);
        assert_eq!(config.suppression_key, DEFAULT_SUPPRESSION_KEY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_partial_toml_keeps_defaults() {
        let config = RecoveryConfig::from_toml_str("product_name = \"Scribe\"\n").unwrap();
        assert_eq!(config, RecoveryConfig::new().with_product_name("Scribe"));
    }

    #[test]
    fn config_rejects_file_scheme() {
        let err = RecoveryConfig::from_toml_str("conflict_scheme = \"file\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_rejects_empty_key() {
        let err = RecoveryConfig::from_toml_str("suppression_key = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("suppression_key"));
    }

    #[test]
    fn config_rejects_malformed_toml() {
        assert!(matches!(
            RecoveryConfig::from_toml_str("product_name = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "conflict_scheme = \"diskSnapshot\"").unwrap();
        writeln!(file, "learn_more_url = \"https://docs.local/conflicts\"").unwrap();

        let config = RecoveryConfig::load(file.path()).await.unwrap();
        assert_eq!(config.conflict_scheme, "diskSnapshot");
        assert_eq!(config.learn_more_url, "https://docs.local/conflicts");
    }

    #[tokio::test]
    async fn config_load_missing_file() {
        let err = RecoveryConfig::load("/nonexistent/saveguard.toml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
