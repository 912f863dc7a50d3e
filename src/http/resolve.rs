//! Mapping request targets onto the document root.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::http::percent;

/// What a resolved path refers to on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File { size: u64 },
    Directory,
    Missing,
}

/// A request target mapped onto the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Root-relative lookup key; `"."` for the root itself.
    pub key: PathBuf,
    /// Absolute path under the document root.
    pub path: PathBuf,
    /// Normalized, percent-encoded URL path (leading `/`, trailing `/` for
    /// directories).
    pub url_path: String,
    /// Normalized, decoded URL path for display.
    pub display_path: String,
    pub kind: TargetKind,
}

impl Target {
    pub fn is_missing(&self) -> bool {
        self.kind == TargetKind::Missing
    }
}

/// The base directory all client-visible paths resolve against.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Canonicalizes `root`; fails if it does not exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves a raw request target.
    ///
    /// The query and fragment are dropped, the rest is percent-decoded and
    /// normalized (`.` segments removed, `..` never climbing above the
    /// root). A target whose canonical location lies outside the root, for
    /// instance through a symlink, or which contains a NUL byte, resolves as
    /// missing.
    pub fn resolve(&self, raw_path: impl AsRef<[u8]>) -> Target {
        let raw = raw_path.as_ref();
        let end = raw
            .iter()
            .position(|&b| b == b'?' || b == b'#')
            .unwrap_or(raw.len());
        let decoded = percent::decode(&raw[..end]);
        let segments = normalize(&decoded);

        let key = if segments.is_empty() {
            PathBuf::from(".")
        } else {
            segments
                .iter()
                .map(|s| OsStr::from_bytes(s))
                .collect::<PathBuf>()
        };
        let path = self.root.join(&key);

        let mut url_path = String::from("/");
        let mut display_path = String::from("/");
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                url_path.push('/');
                display_path.push('/');
            }
            url_path.push_str(&percent::encode_segment(segment));
            display_path.push_str(&String::from_utf8_lossy(segment));
        }

        let kind = if decoded.contains(&0) {
            TargetKind::Missing
        } else {
            self.inspect(&path)
        };

        if kind == TargetKind::Directory && !segments.is_empty() {
            url_path.push('/');
            display_path.push('/');
        }

        Target {
            key,
            path,
            url_path,
            display_path,
            kind,
        }
    }

    fn inspect(&self, path: &Path) -> TargetKind {
        let Ok(metadata) = fs::metadata(path) else {
            return TargetKind::Missing;
        };

        match fs::canonicalize(path) {
            Ok(canonical) if canonical.starts_with(&self.root) => {}
            Ok(canonical) => {
                tracing::warn!(
                    path = %path.display(),
                    resolved = %canonical.display(),
                    "Target escapes document root"
                );
                return TargetKind::Missing;
            }
            Err(_) => return TargetKind::Missing,
        }

        if metadata.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::File {
                size: metadata.len(),
            }
        }
    }
}

/// Splits a decoded path into segments, dropping empty and `.` segments and
/// letting `..` remove the previous segment (or nothing at the root).
pub fn normalize(path: &[u8]) -> Vec<&[u8]> {
    let mut stack: Vec<&[u8]> = Vec::new();

    for part in path.split(|&b| b == b'/') {
        match part {
            b"" | b"." => continue,
            b".." => {
                stack.pop();
            }
            _ => stack.push(part),
        }
    }

    stack
}
