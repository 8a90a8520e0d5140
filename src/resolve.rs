// src/resolve.rs

// dependencies
use crate::errors::ResolveError;
use crate::fs::FileSystem;
use std::io;
use std::path::{Path, PathBuf};

// struct type which represents a request path that matched something under the mount root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub relative_path: PathBuf,
    pub is_directory: bool,
    pub size_bytes: Option<u64>,
    pub index_path: Option<PathBuf>,
}

// methods for the ResolvedTarget type
impl ResolvedTarget {
    // the file itself, or a directory's index document
    pub fn content_path(&self) -> Option<&Path> {
        if self.is_directory {
            self.index_path.as_deref()
        } else {
            Some(&self.relative_path)
        }
    }
}

// struct type which represents the existence check for a mount
#[derive(Debug, Clone)]
pub struct PathResolver<Fs> {
    fs: Fs,
    index_file: String,
    allow_directory_index: bool,
}

// methods for the PathResolver type
impl<Fs: FileSystem> PathResolver<Fs> {
    pub fn new(fs: Fs, index_file: impl Into<String>, allow_directory_index: bool) -> Self {
        PathResolver {
            fs,
            index_file: index_file.into(),
            allow_directory_index,
        }
    }

    pub fn exists(&self, request_path: &str, mount_prefix: &str) -> bool {
        self.resolve(request_path, mount_prefix).is_some()
    }

    // resolve the entry to be served, or None when the request is not ours to answer
    pub fn resolve(&self, request_path: &str, mount_prefix: &str) -> Option<ResolvedTarget> {
        let mount_prefix = normalize_mount_path(mount_prefix);
        let remainder = strip_mount_prefix(&mount_prefix, request_path)?;

        let relative_path = match sanitize_path(remainder) {
            Ok(path) => path,
            Err(err) => {
                if matches!(err, ResolveError::OutsideRoot) {
                    log::warn!("path traversal attempt blocked: {}", request_path);
                } else {
                    log::debug!("rejected static path '{}': {}", request_path, err);
                }
                return None;
            }
        };

        match self.lookup(relative_path) {
            Ok(target) => target,
            Err(ResolveError::Io(err)) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::debug!("static lookup for '{}' failed: {}", request_path, err);
                None
            }
        }
    }

    fn lookup(&self, relative_path: PathBuf) -> Result<Option<ResolvedTarget>, ResolveError> {
        let stat = self.fs.stat(&relative_path)?;

        if !stat.is_dir && !stat.is_file {
            log::debug!("'{}' is not a regular file", relative_path.display());
            return Ok(None);
        }

        if stat.is_file {
            return Ok(Some(ResolvedTarget {
                relative_path,
                is_directory: false,
                size_bytes: Some(stat.len),
                index_path: None,
            }));
        }

        let index = relative_path.join(&self.index_file);
        let index_path = match self.fs.stat(&index) {
            Ok(index_stat) if index_stat.is_file => Some(index),
            _ => None,
        };

        if index_path.is_none() && !self.allow_directory_index {
            return Ok(None);
        }

        Ok(Some(ResolvedTarget {
            relative_path,
            is_directory: true,
            size_bytes: None,
            index_path,
        }))
    }

    // utility to return the backing filesystem
    pub fn filesystem(&self) -> &Fs {
        &self.fs
    }

    // utility to return the index document name
    pub fn index_file(&self) -> &str {
        &self.index_file
    }

    // utility to return whether directories without an index document are still served
    pub fn allow_directory_index(&self) -> bool {
        self.allow_directory_index
    }
}

// helper function to normalize a mount path: leading slash, no trailing slash, "" for the root
pub fn normalize_mount_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');

    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

// helper function which strips a normalized mount path on a segment boundary; the rest is empty
// or starts with '/'
pub fn strip_mount_prefix<'a>(mount_path: &str, request_path: &'a str) -> Option<&'a str> {
    let rest = request_path.strip_prefix(mount_path)?;

    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

// helper function which turns the part after the mount into a relative path that can not climb
// above the mount root
fn sanitize_path(remainder: &str) -> Result<PathBuf, ResolveError> {
    let decoded = urlencoding::decode(remainder).map_err(|_| ResolveError::InvalidEncoding)?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or(ResolveError::OutsideRoot)?;
            }
            _ => {
                if let Some(c) = segment.chars().find(|c| matches!(c, '\\' | '\0')) {
                    return Err(ResolveError::InvalidSegment(c));
                }
                segments.push(segment);
            }
        }
    }

    Ok(segments.iter().collect())
}
