use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ark_archive::{IngestConfig, MissingResourcePolicy};
use ark_proxy::ProxyBackend;
use ark_resolve::config::RESOLVER_NAMES;
use ark_resolve::{parse_patterns, ChainConfig};
use ark_store::{CollisionPolicy, StoreConfig};
use ark_types::DefinitionNaming;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "ARK_";

/// Aggregated configuration for loaders and object factories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArkConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub chain: ChainConfig,
    /// Wrap factory-created objects in proxies.
    pub auto_proxy: bool,
    pub proxy_backend: ProxyBackend,
    /// Root directories searched by the `system` resolver.
    pub search_path: Vec<PathBuf>,
}

impl ArkConfig {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.sync_naming();
        Ok(config)
    }

    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SdkError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> SdkResult<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ARK_*` overrides read through `lookup`.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> SdkResult<()> {
        let get = |suffix: &str| {
            let key = format!("{ENV_PREFIX}{suffix}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = get("COLLISION_POLICY") {
            self.store.collision = CollisionPolicy::parse(&value).ok_or_else(|| invalid(&key, &value))?;
        }
        if let Some((key, value)) = get("MISSING_RESOURCES") {
            self.ingest.missing =
                MissingResourcePolicy::parse(&value).ok_or_else(|| invalid(&key, &value))?;
        }
        if let Some((key, value)) = get("AUTO_PROXY") {
            self.auto_proxy = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = get("PROXY_BACKEND") {
            self.proxy_backend = match value.trim().to_ascii_lowercase().as_str() {
                "interface" => ProxyBackend::Interface,
                "extension" => ProxyBackend::Extension,
                _ => return Err(invalid(&key, &value)),
            };
        }
        if let Some((key, value)) = get("BOOT_DELEGATION") {
            self.chain.delegation.enabled = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = get("BOOT_DELEGATION_STRICT") {
            self.chain.delegation.strict = parse_bool(&key, &value)?;
        }
        if let Some((_, value)) = get("BOOT_DELEGATION_PATTERNS") {
            self.chain.delegation.patterns = parse_patterns(&value);
        }
        if let Some((key, value)) = get("DEFINITION_EXTENSION") {
            self.chain.naming.extension = DefinitionNaming::with_extension(value.clone())
                .map_err(|_| invalid(&key, &value))?
                .extension;
        }

        for name in RESOLVER_NAMES {
            let upper = name.to_ascii_uppercase();
            let enabled = get(&format!("{upper}_ENABLED"));
            let priority = get(&format!("{upper}_PRIORITY"));
            let Some(settings) = self.chain.resolver_mut(name) else {
                continue;
            };
            if let Some((key, value)) = enabled {
                settings.enabled = parse_bool(&key, &value)?;
            }
            if let Some((key, value)) = priority {
                settings.priority = value.trim().parse().map_err(|_| invalid(&key, &value))?;
            }
        }

        if let Some((_, value)) = get("PATH") {
            self.search_path = std::env::split_paths(&OsString::from(value)).collect();
        }

        self.sync_naming();
        Ok(())
    }

    /// Ingestion and resolution must agree on which files are definitions.
    fn sync_naming(&mut self) {
        self.ingest.naming = self.chain.naming.clone();
    }
}

fn invalid(key: &str, value: &str) -> SdkError {
    SdkError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> SdkResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
