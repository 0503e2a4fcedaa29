//! Content-Type guessing for served files.

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

const SNIFF_LEN: usize = 512;

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("wasm", "application/wasm"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
];

/// Looks up a content type by file extension, ignoring case.
pub fn from_extension(file_name: &str) -> Option<&'static str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Guesses the content type of a file from its name, falling back to a
/// look at the first bytes: UTF-8 text without NUL bytes is `text/plain`,
/// anything else is `application/octet-stream`.
pub fn guess_content_type(file_name: &str, contents: &[u8]) -> &'static str {
    if let Some(mime) = from_extension(file_name) {
        return mime;
    }

    let head = &contents[..contents.len().min(SNIFF_LEN)];
    if !head.is_empty() && !head.contains(&0) && looks_like_utf8(head, contents.len() > SNIFF_LEN) {
        "text/plain"
    } else {
        FALLBACK_MIME_TYPE
    }
}

/// A truncated sample may end in the middle of a multi-byte sequence.
fn looks_like_utf8(head: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}
