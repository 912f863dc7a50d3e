use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::StaticFilesConfig;
use crate::http::listing::DirectoryListing;
use crate::http::mime::{self, HTML_CONTENT_TYPE};
use crate::http::request::RequestLine;
use crate::http::resolve::{DocumentRoot, TargetKind};
use crate::http::response::{ResponseHead, StatusCode};
use crate::http::writer::{Body, ResponseWriter};

/// Turns request lines into responses over a document root.
#[derive(Debug, Clone)]
pub struct FileService {
    root: DocumentRoot,
    not_found_page: PathBuf,
    chunk_size: usize,
    pacing: Option<Duration>,
}

impl FileService {
    pub fn new(root: DocumentRoot, config: &StaticFilesConfig) -> Self {
        Self {
            root,
            not_found_page: config.not_found_page.clone(),
            chunk_size: config.chunk_size,
            pacing: config.pacing(),
        }
    }

    /// Builds the response for one request: a file, a directory listing or
    /// the not-found page.
    pub fn respond(&self, request: &RequestLine) -> ResponseWriter {
        let target = self.root.resolve(&request.path);

        let writer = match target.kind {
            TargetKind::Missing => self.not_found(),
            TargetKind::Directory => {
                let listing =
                    DirectoryListing::read(&target.path, &target.display_path, &target.url_path);
                match listing {
                    Ok(listing) => ResponseWriter::new(
                        ResponseHead::new(StatusCode::Ok, HTML_CONTENT_TYPE, None),
                        Body::Listing(listing),
                    ),
                    Err(e) => {
                        warn!(
                            path = %target.path.display(),
                            error = %e,
                            "Failed to read directory"
                        );
                        self.not_found()
                    }
                }
            }
            TargetKind::File { size } => match File::open(&target.path) {
                Ok(file) => ResponseWriter::new(
                    ResponseHead::new(
                        StatusCode::Ok,
                        mime::content_type(&target.key.to_string_lossy()),
                        Some(size),
                    ),
                    Body::File {
                        file,
                        remaining: size,
                    },
                ),
                Err(e) => {
                    warn!(path = %target.path.display(), error = %e, "Failed to open file");
                    self.not_found()
                }
            },
        };

        info!(
            method = request.method.as_str(),
            path = %request.path_lossy(),
            key = %target.key.display(),
            status = writer.status().as_u16(),
            "Request served"
        );

        writer
            .with_chunk_size(self.chunk_size)
            .with_pacing(self.pacing)
    }

    /// 404 with the not-found page as body, or no body at all when that page
    /// cannot be read.
    fn not_found(&self) -> ResponseWriter {
        let page = self.root.path().join(&self.not_found_page);

        let opened = File::open(&page).and_then(|file| {
            let metadata = file.metadata()?;
            Ok((file, metadata.len()))
        });

        match opened {
            Ok((file, size)) => ResponseWriter::new(
                ResponseHead::new(StatusCode::NotFound, HTML_CONTENT_TYPE, Some(size)),
                Body::File {
                    file,
                    remaining: size,
                },
            ),
            Err(e) => {
                warn!(page = %page.display(), error = %e, "Not-found page unavailable");
                ResponseWriter::new(
                    ResponseHead::new(StatusCode::NotFound, HTML_CONTENT_TYPE, Some(0)),
                    Body::Empty,
                )
            }
        }
    }
}
