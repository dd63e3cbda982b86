use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IngestError, IngestResult};
use crate::format::Compression;

const ZSTD_LEVEL: i32 = 3;

enum Pending {
    Directory(String),
    File(String, Vec<u8>),
}

/// Builds tar archives from named payloads or directory trees.
///
/// Entries are written in insertion order with zeroed timestamps, so the
/// same inputs always produce the same bytes.
pub struct ArchiveWriter {
    compression: Compression,
    entries: Vec<Pending>,
}

impl ArchiveWriter {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            entries: Vec::new(),
        }
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Queue a regular file entry.
    pub fn add(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.entries.push(Pending::File(name.into(), bytes.into()));
        self
    }

    /// Queue a directory entry.
    pub fn add_directory(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.push(Pending::Directory(name.into()));
        self
    }

    /// Queue every file below `root`, named by its forward-slash path
    /// relative to `root`. Returns the number of files queued.
    pub fn add_dir_tree(&mut self, root: &Path) -> IngestResult<usize> {
        let mut count = 0;
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| IngestError::Io {
                context: format!("walking {}", root.display()),
                source: std::io::Error::from(e),
            })?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                self.add_directory(rel);
            } else if entry.file_type().is_file() {
                let bytes = fs::read(entry.path())
                    .map_err(IngestError::io(format!("reading {}", entry.path().display())))?;
                self.add(rel, bytes);
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the queued entries.
    pub fn finish_to_bytes(&self) -> IngestResult<Vec<u8>> {
        let tar = self.build_tar()?;
        match self.compression {
            Compression::None => Ok(tar),
            Compression::Gzip => {
                let mut encoder =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder
                    .write_all(&tar)
                    .map_err(IngestError::io("compressing archive"))?;
                encoder.finish().map_err(IngestError::io("compressing archive"))
            }
            Compression::Zstd => zstd::encode_all(tar.as_slice(), ZSTD_LEVEL)
                .map_err(IngestError::io("compressing archive")),
        }
    }

    /// Encode the queued entries and write them to `path`.
    pub fn finish(&self, path: &Path) -> IngestResult<PathBuf> {
        let bytes = self.finish_to_bytes()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(IngestError::io(format!("creating {}", parent.display())))?;
        }
        fs::write(path, bytes).map_err(IngestError::io(format!("writing {}", path.display())))?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "wrote archive");
        Ok(path.to_path_buf())
    }

    fn build_tar(&self) -> IngestResult<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        for entry in &self.entries {
            let mut header = tar::Header::new_gnu();
            header.set_mtime(0);
            match entry {
                Pending::Directory(name) => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder
                        .append_data(&mut header, name, std::io::empty())
                        .map_err(IngestError::io(format!("packing {name}")))?;
                }
                Pending::File(name, bytes) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_mode(0o644);
                    header.set_size(bytes.len() as u64);
                    builder
                        .append_data(&mut header, name, bytes.as_slice())
                        .map_err(IngestError::io(format!("packing {name}")))?;
                }
            }
        }
        builder.into_inner().map_err(IngestError::io("finishing archive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_is_deterministic() {
        let mut a = ArchiveWriter::new(Compression::Gzip);
        a.add("x", b"1".to_vec()).add("y", b"2".to_vec());
        let mut b = ArchiveWriter::new(Compression::Gzip);
        b.add("x", b"1".to_vec()).add("y", b"2".to_vec());
        assert_eq!(a.finish_to_bytes().unwrap(), b.finish_to_bytes().unwrap());
    }

    #[test]
    fn compressed_output_carries_magic() {
        let mut w = ArchiveWriter::new(Compression::Gzip);
        w.add("x", b"1".to_vec());
        assert_eq!(Compression::sniff(&w.finish_to_bytes().unwrap()), Compression::Gzip);

        let mut w = ArchiveWriter::new(Compression::Zstd);
        w.add("x", b"1".to_vec());
        assert_eq!(Compression::sniff(&w.finish_to_bytes().unwrap()), Compression::Zstd);
    }

    #[test]
    fn dir_tree_is_packed_relative() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/c.txt"), b"c").unwrap();
        fs::write(dir.path().join("top.txt"), b"t").unwrap();

        let mut w = ArchiveWriter::new(Compression::None);
        assert_eq!(w.add_dir_tree(dir.path()).unwrap(), 2);
        assert_eq!(w.len(), 4);

        let out = dir.path().join("out/packed.tar");
        w.finish(&out).unwrap();
        let mut archive = tar::Archive::new(fs::File::open(&out).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                let path = e.path().unwrap().to_string_lossy().into_owned();
                path.trim_end_matches('/').to_string()
            })
            .collect();
        assert_eq!(names, vec!["a", "a/b", "a/b/c.txt", "top.txt"]);
    }
}
