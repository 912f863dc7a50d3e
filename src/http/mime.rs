//! Content-Type lookup by file extension.

/// Content type used when a name has no extension or an unknown one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type for HTML documents (listings and the not-found page).
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Resolves the Content-Type for a file name.
///
/// The extension is everything after the last `.` of the final path
/// component and is matched case-sensitively, so `.html` maps to HTML while
/// `.HTML` falls back to plain text.
///
/// # Example
///
/// ```
/// # use lantern::http::mime::content_type;
/// assert_eq!(content_type("photo.png"), "image/png");
/// assert_eq!(content_type(".html"), "text/html; charset=utf-8");
/// assert_eq!(content_type("README"), "text/plain; charset=utf-8");
/// ```
pub fn content_type(name: &str) -> &'static str {
    let file_name = name.rsplit('/').next().unwrap_or(name);

    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext {
        "html" | "htm" => HTML_CONTENT_TYPE,
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "css" => "text/css",
        "au" => "audio/basic",
        "wav" => "audio/wav",
        "avi" => "video/x-msvideo",
        "mov" | "qt" => "video/quicktime",
        "mpeg" | "mpe" => "video/mpeg",
        "vrml" | "wrl" => "model/vrml",
        "midi" | "mid" => "audio/midi",
        "mp3" => "audio/mpeg",
        "ogg" => "application/ogg",
        "pac" => "application/x-ns-proxy-autoconfig",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
