//! Archive ingestion for ark.
//!
//! [`ArchiveIngester`] fills an [`ark_store::ArtifactStore`] from:
//!
//! - tar archives, plain or gzip/zstd compressed (detected from the leading
//!   bytes, not the file name)
//! - loose files and directory trees, keyed by their package path
//! - `http(s)` URLs, fetched with a blocking client
//!
//! [`ArchiveWriter`] produces archives in the same formats.
//!
//! Ingestion is not transactional: when a source fails part way, the entries
//! already written stay in the store.

pub mod config;
pub mod error;
pub mod format;
pub mod ingester;
pub mod source;
pub mod writer;

pub use config::{IngestConfig, MissingResourcePolicy};
pub use error::{IngestError, IngestResult};
pub use format::{is_archive_name, Compression};
pub use ingester::{ArchiveIngester, IngestReport};
pub use source::ArchiveSource;
pub use writer::ArchiveWriter;
