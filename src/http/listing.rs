//! Generated HTML directory listings.
//!
//! Entries are read and sorted up front, then rendered one table row at a
//! time so the response can be streamed in pieces.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use bytes::{BufMut, BytesMut};

use crate::http::percent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: OsString,
    pub is_dir: bool,
    pub size: u64,
}

impl ListingEntry {
    /// Link target relative to the listed directory's URL.
    pub fn href(&self, base: &str) -> String {
        let mut href = String::from(base);
        href.push_str(&percent::encode_segment(self.name.as_bytes()));
        if self.is_dir {
            href.push('/');
        }
        href
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Rows,
    Done,
}

/// A directory listing being rendered.
#[derive(Debug)]
pub struct DirectoryListing {
    title: String,
    base_href: String,
    entries: std::vec::IntoIter<ListingEntry>,
    stage: Stage,
}

impl DirectoryListing {
    /// Reads `dir` and prepares a listing titled `title`, whose links are
    /// prefixed with `base_href` (an already encoded URL path ending in `/`).
    pub fn read(dir: &Path, title: &str, base_href: &str) -> io::Result<Self> {
        Ok(Self::from_entries(read_entries(dir)?, title, base_href))
    }

    pub fn from_entries(mut entries: Vec<ListingEntry>, title: &str, base_href: &str) -> Self {
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Self {
            title: escape_html(title),
            base_href: base_href.to_string(),
            entries: entries.into_iter(),
            stage: Stage::Header,
        }
    }

    /// Appends the next piece of markup to `dst`. Returns false once the
    /// whole document has been produced.
    pub fn next_chunk(&mut self, dst: &mut BytesMut) -> bool {
        match self.stage {
            Stage::Header => {
                dst.put_slice(
                    format!(
                        "<html><head><title>{}</title></head><body><table>",
                        self.title
                    )
                    .as_bytes(),
                );
                self.stage = Stage::Rows;
                true
            }
            Stage::Rows => {
                match self.entries.next() {
                    Some(entry) => {
                        let row = format!(
                            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
                            escape_html(&entry.href(&self.base_href)),
                            escape_html(&entry.name.to_string_lossy()),
                            entry.size
                        );
                        dst.put_slice(row.as_bytes());
                    }
                    None => {
                        dst.put_slice(b"</table></body></html>");
                        self.stage = Stage::Done;
                    }
                }
                true
            }
            Stage::Done => false,
        }
    }

    /// Renders the remaining document in one buffer.
    pub fn render(mut self) -> Vec<u8> {
        let mut out = BytesMut::new();
        while self.next_chunk(&mut out) {}
        out.to_vec()
    }
}

/// Lists `dir` with metadata that follows symlinks, falling back to the
/// link itself when it dangles.
pub fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => fs::symlink_metadata(&path)?,
        };

        entries.push(ListingEntry {
            name: entry.file_name(),
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }

    Ok(entries)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_escaped() {
        let entries = vec![ListingEntry {
            name: OsString::from("<b>.txt"),
            is_dir: false,
            size: 1,
        }];
        let html =
            String::from_utf8(DirectoryListing::from_entries(entries, "/", "/").render()).unwrap();

        assert!(html.contains("&lt;b&gt;.txt</a>"));
        assert!(html.contains("href=\"/%3Cb%3E.txt\""));
    }
}
