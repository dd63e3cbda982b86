use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use ark_store::ArtifactStore;
use ark_types::{join_package, ResourceKind};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;
use walkdir::WalkDir;

use crate::config::{IngestConfig, MissingResourcePolicy};
use crate::error::{IngestError, IngestResult};
use crate::format::{is_archive_name, Compression};
use crate::source::ArchiveSource;

/// Upper bound on the buffer reserved up front for one archive entry. The
/// size in a tar header is untrusted; larger entries grow while reading.
const ENTRY_PREALLOC_LIMIT: u64 = 1 << 20;

/// Summary of one ingestion call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Entries newly written to the store.
    pub inserted: usize,
    /// Entries dropped because the name was already loaded.
    pub skipped: usize,
    /// Directory entries seen inside archives.
    pub directories: usize,
}

impl IngestReport {
    fn absorb(&mut self, other: IngestReport) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.directories += other.directories;
    }
}

/// Reads archives, loose files, directories and remote sources into an
/// [`ArtifactStore`].
///
/// Entries written before a failure stay in the store.
pub struct ArchiveIngester {
    store: Arc<dyn ArtifactStore>,
    config: IngestConfig,
}

impl ArchiveIngester {
    pub fn new(store: Arc<dyn ArtifactStore>, config: IngestConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest a single source.
    pub fn ingest(&self, source: impl Into<ArchiveSource>) -> IngestResult<IngestReport> {
        match source.into() {
            ArchiveSource::Path(path) => self.ingest_path(&path),
            ArchiveSource::Url(url) => self.ingest_url(&url),
            ArchiveSource::Stream(reader) => self.ingest_stream(reader),
        }
    }

    /// Ingest several sources in order, stopping at the first failure.
    pub fn ingest_all<I, S>(&self, sources: I) -> IngestResult<IngestReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<ArchiveSource>,
    {
        let mut total = IngestReport::default();
        for source in sources {
            total.absorb(self.ingest(source)?);
        }
        Ok(total)
    }

    /// Walk a tar stream (plain, gzip or zstd) into the store.
    ///
    /// The base locator is left untouched.
    pub fn ingest_stream<R: Read>(&self, reader: R) -> IngestResult<IngestReport> {
        let mut report = IngestReport::default();
        self.walk_archive(reader, &mut report)?;
        tracing::debug!(
            inserted = report.inserted,
            skipped = report.skipped,
            "ingested archive stream"
        );
        Ok(report)
    }

    /// Ingest a local archive, loose file or directory.
    pub fn ingest_path(&self, path: &Path) -> IngestResult<IngestReport> {
        let mut report = IngestReport::default();

        if !path.exists() {
            return match self.config.missing {
                MissingResourcePolicy::Ignore => {
                    tracing::warn!(path = %path.display(), "source does not exist; skipping");
                    Ok(report)
                }
                MissingResourcePolicy::Raise => Err(IngestError::Missing(path.to_path_buf())),
            };
        }

        if path.is_dir() {
            self.ingest_dir(path, &mut report)?;
        } else {
            self.ingest_file(path, "", &mut report)?;
        }

        tracing::info!(
            source = %path.display(),
            inserted = report.inserted,
            skipped = report.skipped,
            "ingested local source"
        );
        Ok(report)
    }

    /// Ingest a URL. `file://` URLs go through [`Self::ingest_path`].
    pub fn ingest_url(&self, raw: &str) -> IngestResult<IngestReport> {
        let url = Url::parse(raw).map_err(|_| IngestError::InvalidUrl(raw.to_string()))?;

        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| IngestError::InvalidUrl(raw.to_string()))?;
            return self.ingest_path(&path);
        }

        let mut report = IngestReport::default();
        if is_archive_name(url.path()) {
            self.store.set_base_locator(Some(url.to_string()));
            let walked = self
                .fetch(&url)
                .and_then(|body| self.walk_archive(body, &mut report));
            if let Err(e) = walked {
                self.store.set_base_locator(None);
                return Err(e);
            }
        } else {
            let name = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| IngestError::InvalidUrl(raw.to_string()))?
                .to_string();
            let mut body = self.fetch(&url)?;
            let mut buf = Vec::new();
            body.read_to_end(&mut buf)
                .map_err(IngestError::io(format!("reading {url}")))?;
            self.insert(&name, Bytes::from(buf), &mut report)?;
        }

        tracing::info!(
            source = %url,
            inserted = report.inserted,
            skipped = report.skipped,
            "ingested remote source"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn fetch(&self, url: &Url) -> IngestResult<reqwest::blocking::Response> {
        tracing::debug!(%url, "fetching remote source");
        reqwest::blocking::get(url.clone())
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| IngestError::Remote {
                url: url.to_string(),
                source,
            })
    }

    fn ingest_file(&self, path: &Path, package: &str, report: &mut IngestReport) -> IngestResult<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if is_archive_name(&file_name) {
            return self.ingest_archive_file(path, report);
        }

        let bytes = fs::read(path).map_err(IngestError::io(format!("reading {}", path.display())))?;
        let name = join_package(package, &file_name);
        tracing::trace!(
            artifact = %name,
            kind = %ResourceKind::classify(&name, &self.config.naming),
            "loading loose file"
        );
        self.insert(&name, Bytes::from(bytes), report)
    }

    fn ingest_archive_file(&self, path: &Path, report: &mut IngestReport) -> IngestResult<()> {
        let absolute = fs::canonicalize(path)
            .map_err(IngestError::io(format!("resolving {}", path.display())))?;
        let base = Url::from_file_path(&absolute)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("file://{}", absolute.display()));

        self.store.set_base_locator(Some(base));
        let walked = File::open(&absolute)
            .map_err(IngestError::io(format!("opening {}", absolute.display())))
            .and_then(|file| self.walk_archive(file, report));
        if let Err(e) = walked {
            self.store.set_base_locator(None);
            return Err(e);
        }
        Ok(())
    }

    fn ingest_dir(&self, root: &Path, report: &mut IngestReport) -> IngestResult<()> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| IngestError::Io {
                context: format!("walking {}", root.display()),
                source: std::io::Error::from(e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let package = package_path(root, entry.path());
            self.ingest_file(entry.path(), &package, report)?;
        }
        Ok(())
    }

    fn walk_archive<R: Read>(&self, reader: R, report: &mut IngestReport) -> IngestResult<()> {
        let mut reader = BufReader::new(reader);
        let head = reader
            .fill_buf()
            .map_err(IngestError::io("reading archive header"))?;

        match Compression::sniff(head) {
            Compression::Gzip => self.walk_tar(flate2::read::GzDecoder::new(reader), report),
            Compression::Zstd => {
                let decoder = zstd::stream::read::Decoder::with_buffer(reader)
                    .map_err(IngestError::io("opening zstd stream"))?;
                self.walk_tar(decoder, report)
            }
            Compression::None => self.walk_tar(reader, report),
        }
    }

    fn walk_tar<R: Read>(&self, reader: R, report: &mut IngestReport) -> IngestResult<()> {
        let mut archive = tar::Archive::new(reader);
        let entries = archive
            .entries()
            .map_err(IngestError::io("reading archive entries"))?;

        for entry in entries {
            let mut entry = entry.map_err(IngestError::io("reading archive entry"))?;
            let name = entry
                .path()
                .map_err(IngestError::io("decoding entry name"))?
                .to_string_lossy()
                .into_owned();
            let entry_type = entry.header().entry_type();

            if entry_type.is_dir() {
                report.directories += 1;
                continue;
            }
            if !entry_type.is_file() {
                tracing::trace!(entry = %name, "skipping non-regular entry");
                continue;
            }

            let declared = entry.size();
            let hint = usize::try_from(declared.min(ENTRY_PREALLOC_LIMIT)).unwrap_or(0);
            let mut buf = Vec::with_capacity(hint);
            entry
                .read_to_end(&mut buf)
                .map_err(IngestError::io(format!("reading entry {name}")))?;
            if buf.len() as u64 != declared {
                return Err(IngestError::Io {
                    context: format!("reading entry {name}"),
                    source: io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("entry holds {} of {declared} declared bytes", buf.len()),
                    ),
                });
            }
            self.insert(&name, Bytes::from(buf), report)?;
        }
        Ok(())
    }

    fn insert(&self, name: &str, bytes: Bytes, report: &mut IngestReport) -> IngestResult<()> {
        if self.store.put(name, bytes)? {
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ArchiveIngester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveIngester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Forward-slash path of `file`'s parent directory relative to `root`.
fn package_path(root: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}
