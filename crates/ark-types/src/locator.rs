use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const SCHEME: &str = "archive:";
const SEPARATOR: &str = "!/";

/// Structured pointer to an artifact inside an ingested archive.
///
/// Rendered as `archive:<base>!/<entry>`, where `base` identifies the
/// originating archive (`file:///abs/lib.tar.gz`, `https://host/lib.tgz`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub base: String,
    pub entry: String,
}

impl Locator {
    pub fn new(base: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            entry: entry.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}{SEPARATOR}{}", self.base, self.entry)
    }
}

impl FromStr for Locator {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| TypeError::InvalidLocator(s.to_string()))?;
        // The base may itself contain "!/" only in pathological cases; the
        // last separator marks the entry.
        let idx = rest
            .rfind(SEPARATOR)
            .ok_or_else(|| TypeError::InvalidLocator(s.to_string()))?;
        let (base, entry) = (&rest[..idx], &rest[idx + SEPARATOR.len()..]);
        if base.is_empty() || entry.is_empty() {
            return Err(TypeError::InvalidLocator(s.to_string()));
        }
        Ok(Self::new(base, entry))
    }
}
