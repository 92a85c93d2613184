//! Runtime configuration.
//!
//! Everything has a default; a TOML document only needs the keys it changes:
//!
//! ```toml
//! [cache]
//! enabled = true
//!
//! [update]
//! dialect = "sqlite"
//! ```

use crate::update::Dialect;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse sieve config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// SieveConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SieveConfig {
    pub cache: CacheConfig,
    pub update: UpdateConfig,
}

impl SieveConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

///
/// CacheConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// When false, every call compiles its descriptors fresh.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

///
/// UpdateConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateConfig {
    pub dialect: Dialect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SieveConfig::from_toml_str("").unwrap();

        assert_eq!(config, SieveConfig::default());
        assert!(config.cache.enabled);
        assert_eq!(config.update.dialect, Dialect::MySql);
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = SieveConfig::from_toml_str(
            r#"
            [update]
            dialect = "sqlite"
            "#,
        )
        .unwrap();

        assert!(config.cache.enabled);
        assert_eq!(config.update.dialect, Dialect::Sqlite);
    }

    #[test]
    fn cache_can_be_disabled() {
        let config = SieveConfig::from_toml_str("[cache]\nenabled = false\n").unwrap();

        assert!(!config.cache.enabled);
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        let err = SieveConfig::from_toml_str("[update]\ndialect = \"oracle\"\n").unwrap_err();

        assert!(err.to_string().starts_with("failed to parse sieve config"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SieveConfig::from_toml_str("[cache]\nsize = 10\n").is_err());
        assert!(SieveConfig::from_toml_str("verbose = true\n").is_err());
    }
}
