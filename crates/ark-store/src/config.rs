use serde::{Deserialize, Serialize};

/// What a store does when a name is written twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the first payload and ignore the new one.
    #[default]
    Skip,
    /// Fail the write with [`crate::StoreError::Collision`].
    Raise,
}

impl CollisionPolicy {
    /// Parse the configuration spelling (`skip`/`raise`, also `true`/`false`
    /// in the sense of "suppress collision errors").
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" | "allow-silent-skip" | "true" => Some(Self::Skip),
            "raise" | "raise-on-collision" | "false" => Some(Self::Raise),
            _ => None,
        }
    }
}

/// Configuration for an artifact store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub collision: CollisionPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_skip() {
        assert_eq!(StoreConfig::default().collision, CollisionPolicy::Skip);
    }

    #[test]
    fn parse_spellings() {
        assert_eq!(CollisionPolicy::parse("Skip"), Some(CollisionPolicy::Skip));
        assert_eq!(CollisionPolicy::parse(" raise "), Some(CollisionPolicy::Raise));
        assert_eq!(CollisionPolicy::parse("false"), Some(CollisionPolicy::Raise));
        assert_eq!(CollisionPolicy::parse("sometimes"), None);
    }

    #[test]
    fn serde_kebab_case() {
        let json = serde_json::to_string(&CollisionPolicy::Raise).unwrap();
        assert_eq!(json, "\"raise\"");
    }
}
