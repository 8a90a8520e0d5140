// src/fs.rs

// dependencies
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// what a stat call reports about an entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    // false for anything that is neither a regular file nor a directory (fifos, sockets, devices)
    pub is_file: bool,
    pub len: u64,
}

/// Read-only access to the files behind a mount. Paths are relative and already normalized.
pub trait FileSystem: Send + Sync {
    type File: Read + Seek + Send;

    /// Open the file at `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Self::File>;

    /// Describe the entry at `path` without opening it.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

fn not_found() -> io::Error {
    io::Error::from(io::ErrorKind::NotFound)
}

// struct type which represents a directory on local disk
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
}

// methods for the LocalFileSystem type
impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let canonical_root = match fs::canonicalize(&root) {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!(
                    "static root '{}' is not accessible, requests will pass through: {}",
                    root.display(),
                    err
                );
                None
            }
        };

        LocalFileSystem { root, canonical_root }
    }

    // utility to return the configured root
    pub fn root(&self) -> &Path {
        &self.root
    }

    // join the relative path onto the root and make sure the real location stays inside it,
    // symlinks included
    fn contained(&self, path: &Path) -> io::Result<PathBuf> {
        let root = self.canonical_root.as_ref().ok_or_else(not_found)?;
        let canonical = fs::canonicalize(root.join(path))?;

        if !canonical.starts_with(root) {
            log::warn!(
                "blocked access outside static root: {} -> {}",
                path.display(),
                canonical.display()
            );
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }

        Ok(canonical)
    }
}

impl FileSystem for LocalFileSystem {
    type File = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(self.contained(path)?)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(self.contained(path)?)?;
        Ok(FileStat {
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            len: metadata.len(),
        })
    }
}

// struct type which represents a set of files held in memory, e.g. assets bundled into the binary
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, Arc<[u8]>>,
}

// methods for the MemoryFileSystem type
impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let key: PathBuf = path
            .as_ref()
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect();
        self.files.insert(key, Arc::from(contents.into()));
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty()
            || self
                .files
                .keys()
                .any(|key| key != path && key.starts_with(path))
    }
}

impl FileSystem for MemoryFileSystem {
    type File = Cursor<Arc<[u8]>>;

    fn open(&self, path: &Path) -> io::Result<Self::File> {
        self.files
            .get(path)
            .map(|contents| Cursor::new(Arc::clone(contents)))
            .ok_or_else(not_found)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(contents) = self.files.get(path) {
            return Ok(FileStat {
                is_dir: false,
                is_file: true,
                len: contents.len() as u64,
            });
        }
        if self.is_dir(path) {
            return Ok(FileStat {
                is_dir: true,
                is_file: false,
                len: 0,
            });
        }
        Err(not_found())
    }
}
