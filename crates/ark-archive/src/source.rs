use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use url::Url;

/// Something an [`crate::ArchiveIngester`] can ingest.
pub enum ArchiveSource {
    /// A local file or directory.
    Path(PathBuf),
    /// A URL; `file://` URLs are treated as local paths.
    Url(String),
    /// A raw tar stream (plain, gzip or zstd).
    Stream(Box<dyn Read + Send>),
}

impl ArchiveSource {
    /// Wrap a reader as a stream source.
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }
}

impl fmt::Debug for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Url(u) => f.debug_tuple("Url").field(u).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Strings that parse as `http`, `https` or `file` URLs become
/// [`ArchiveSource::Url`]; anything else is a path.
impl From<&str> for ArchiveSource {
    fn from(s: &str) -> Self {
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => Self::Url(s.to_string()),
            _ => Self::Path(PathBuf::from(s)),
        }
    }
}

impl From<String> for ArchiveSource {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for ArchiveSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for ArchiveSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<Url> for ArchiveSource {
    fn from(u: Url) -> Self {
        Self::Url(u.to_string())
    }
}
