//! Artifact name normalization and definition naming.
//!
//! Store keys are forward-slash separated relative paths:
//! - backslashes are converted to `/`
//! - leading `./` and `/` are stripped
//! - runs of `/` collapse to a single separator
//! - a blank name is rejected
//!
//! Symbolic definition names use `.` between namespace segments and are
//! mapped onto store paths by [`DefinitionNaming`].

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Extension used for definition payloads when none is configured.
pub const DEFAULT_DEFINITION_EXTENSION: &str = "def";

/// Returns `true` if the name is empty or only whitespace.
pub fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

/// Normalize a raw path into the canonical store key.
///
/// # Examples
///
/// ```
/// use ark_types::normalize_name;
///
/// assert_eq!(normalize_name("./conf//app.toml").unwrap(), "conf/app.toml");
/// assert_eq!(normalize_name("\\lib\\a.def").unwrap(), "lib/a.def");
/// assert!(normalize_name("   ").is_err());
/// ```
pub fn normalize_name(raw: &str) -> TypeResult<String> {
    if is_blank(raw) {
        return Err(TypeError::BlankName);
    }

    let slashed = raw.replace('\\', "/");
    let mut rest = slashed.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }

    let mut out = String::with_capacity(rest.len());
    let mut prev_slash = false;
    for ch in rest.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(ch);
    }

    if out.is_empty() {
        return Err(TypeError::BlankName);
    }
    Ok(out)
}

/// Join a package path and a file name, omitting the separator at the root.
pub fn join_package(package: &str, file_name: &str) -> String {
    if package.is_empty() {
        file_name.to_string()
    } else {
        format!("{package}/{file_name}")
    }
}

/// Mapping between symbolic definition names and store paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionNaming {
    /// File extension of definition payloads, without the leading dot.
    pub extension: String,
    /// When set, `.` in a symbolic name is replaced by this character
    /// instead of the path separator.
    pub replacement: Option<char>,
}

impl Default for DefinitionNaming {
    fn default() -> Self {
        Self {
            extension: DEFAULT_DEFINITION_EXTENSION.to_string(),
            replacement: None,
        }
    }
}

impl DefinitionNaming {
    /// Naming with a custom extension.
    pub fn with_extension(extension: impl Into<String>) -> TypeResult<Self> {
        let extension = extension.into();
        let trimmed = extension.trim_start_matches('.');
        if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains('.') {
            return Err(TypeError::InvalidExtension(extension));
        }
        Ok(Self {
            extension: trimmed.to_string(),
            replacement: None,
        })
    }

    /// Map a symbolic name onto its store path.
    ///
    /// `/` already present in the symbolic name is kept as a separator.
    ///
    /// ```
    /// use ark_types::DefinitionNaming;
    ///
    /// let naming = DefinitionNaming::default();
    /// assert_eq!(naming.to_path("com.acme.Widget"), "com/acme/Widget.def");
    /// ```
    pub fn to_path(&self, name: &str) -> String {
        let sep = self.replacement.unwrap_or('/');
        let mut path: String = name
            .chars()
            .map(|c| if c == '.' { sep } else { c })
            .collect();
        path.push('.');
        path.push_str(&self.extension);
        path
    }

    /// Returns `true` if the path carries the definition extension.
    pub fn is_definition_path(&self, path: &str) -> bool {
        path.len() > self.extension.len() + 1
            && path
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", self.extension.to_ascii_lowercase()))
    }

    /// Map a store path back to its symbolic name, if it is a definition.
    pub fn to_symbolic(&self, path: &str) -> Option<String> {
        if !self.is_definition_path(path) {
            return None;
        }
        let stem = &path[..path.len() - self.extension.len() - 1];
        let sep = self.replacement.unwrap_or('/');
        Some(stem.chars().map(|c| if c == sep { '.' } else { c }).collect())
    }
}
