use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names::DefinitionNaming;

/// Coarse classification of an artifact by its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A loadable definition (carries the configured definition extension).
    Definition,
    /// An XML document.
    Xml,
    /// A properties file.
    Properties,
    /// Anything else.
    Unknown,
}

impl ResourceKind {
    /// Classify a store path by extension, case-insensitively.
    pub fn classify(name: &str, naming: &DefinitionNaming) -> Self {
        let lower = name.to_ascii_lowercase();
        if naming.is_definition_path(name) {
            Self::Definition
        } else if lower.ends_with(".properties") {
            Self::Properties
        } else if lower.ends_with(".xml") {
            Self::Xml
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Definition => "definition",
            Self::Xml => "xml",
            Self::Properties => "properties",
            Self::Unknown => "resource",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        let naming = DefinitionNaming::default();
        assert_eq!(ResourceKind::classify("a/B.def", &naming), ResourceKind::Definition);
        assert_eq!(ResourceKind::classify("a/B.DEF", &naming), ResourceKind::Definition);
        assert_eq!(ResourceKind::classify("app.properties", &naming), ResourceKind::Properties);
        assert_eq!(ResourceKind::classify("web.XML", &naming), ResourceKind::Xml);
        assert_eq!(ResourceKind::classify("readme", &naming), ResourceKind::Unknown);
    }

    #[test]
    fn display_names() {
        assert_eq!(ResourceKind::Definition.to_string(), "definition");
        assert_eq!(ResourceKind::Unknown.to_string(), "resource");
    }
}
