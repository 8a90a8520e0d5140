// src/content_type.rs

// dependencies
use crate::config::ContentTypeStrategy;
use crate::fs::FileSystem;
use crate::resolve::ResolvedTarget;
use crate::sniff::{self, SNIFF_LEN};
use std::borrow::Cow;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

// struct type which represents what a detector learned about a resolved target
#[derive(Debug)]
pub struct Detection<F> {
    pub content_type: Option<Cow<'static, str>>,
    pub content_length: Option<u64>,
    // positioned at offset 0
    pub file: Option<F>,
}

impl<F> Detection<F> {
    pub fn unknown() -> Self {
        Detection {
            content_type: None,
            content_length: None,
            file: None,
        }
    }
}

/// Picks the Content-Type to advertise for a resolved target.
///
/// Detection never fails: a target that can not be inspected comes back with no type, and the
/// file is still handed to the file server.
pub trait ContentTypeDetector<Fs: FileSystem>: Send + Sync {
    fn detect(&self, fs: &Fs, target: &ResolvedTarget) -> Detection<Fs::File>;
}

// helper function to guess the mime type from a path's extension
pub fn guess_mime_type(path: &Path) -> Option<Cow<'static, str>> {
    mime_guess::from_path(path)
        .first_raw()
        .map(Cow::Borrowed)
}

// struct type which represents detection by file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionDetector;

impl<Fs: FileSystem> ContentTypeDetector<Fs> for ExtensionDetector {
    fn detect(&self, _fs: &Fs, target: &ResolvedTarget) -> Detection<Fs::File> {
        Detection {
            content_type: target.content_path().and_then(guess_mime_type),
            content_length: None,
            file: None,
        }
    }
}

// struct type which represents detection by reading the first bytes of the file
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffingDetector;

// methods for the SniffingDetector type
impl SniffingDetector {
    fn sniff_file<Fs: FileSystem>(
        fs: &Fs,
        path: &Path,
    ) -> io::Result<(&'static str, u64, Fs::File)> {
        let mut file = fs.open(path)?;

        let mut head = Vec::with_capacity(SNIFF_LEN);
        file.by_ref().take(SNIFF_LEN as u64).read_to_end(&mut head)?;
        file.seek(SeekFrom::Start(0))?;

        let len = fs.stat(path)?.len;

        Ok((sniff::sniff(&head), len, file))
    }
}

impl<Fs: FileSystem> ContentTypeDetector<Fs> for SniffingDetector {
    fn detect(&self, fs: &Fs, target: &ResolvedTarget) -> Detection<Fs::File> {
        let Some(path) = target.content_path() else {
            return Detection::unknown();
        };

        match Self::sniff_file(fs, path) {
            Ok((content_type, len, file)) => Detection {
                content_type: Some(Cow::Borrowed(content_type)),
                content_length: Some(len),
                file: Some(file),
            },
            Err(err) => {
                log::debug!("could not sniff '{}': {}", path.display(), err);
                Detection::unknown()
            }
        }
    }
}

// build the detector a mount was configured with
pub fn detector_for<Fs: FileSystem>(
    strategy: ContentTypeStrategy,
) -> Box<dyn ContentTypeDetector<Fs>> {
    match strategy {
        ContentTypeStrategy::Extension => Box::new(ExtensionDetector),
        ContentTypeStrategy::Sniff => Box::new(SniffingDetector),
    }
}
