use ark_types::DefinitionNaming;
use serde::{Deserialize, Serialize};

/// What ingestion does with a local source path that does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingResourcePolicy {
    /// Log a warning and ingest nothing.
    #[default]
    Ignore,
    /// Fail with [`crate::IngestError::Missing`].
    Raise,
}

impl MissingResourcePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" | "true" => Some(Self::Ignore),
            "raise" | "false" => Some(Self::Raise),
            _ => None,
        }
    }
}

/// Configuration for an [`crate::ArchiveIngester`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub missing: MissingResourcePolicy,
    /// Decides which loose files count as definitions.
    pub naming: DefinitionNaming,
}
