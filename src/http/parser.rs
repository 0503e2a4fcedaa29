use std::fmt;

use crate::http::request::Request;

const CRLF: &str = "\r\n";
const HEAD_END: &str = "\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The bytes so far are a valid prefix but the blank line ending the
    /// header block has not arrived yet.
    Incomplete,
    InvalidRequestLine,
    InvalidHeader,
}

impl ParseError {
    /// Whether the input can never become a valid request.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ParseError::Incomplete)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Incomplete => write!(f, "incomplete request"),
            ParseError::InvalidRequestLine => write!(f, "malformed request-line"),
            ParseError::InvalidHeader => write!(f, "malformed header line"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one request head out of `buf`.
///
/// ```text
/// request      := method SP request-uri SP http-version CRLF headers CRLF
/// http-version := "HTTP/" digit "." digit
/// header-line  := header-name ":" SP? header-value CRLF
/// ```
///
/// Returns `Ok(None)` for an empty buffer: nothing was received, which is
/// not an error. Anything after the header block is ignored.
pub fn parse_request(buf: &[u8]) -> Result<Option<Request>, ParseError> {
    if buf.is_empty() {
        return Ok(None);
    }

    // Latin-1: every byte is one char, so no input is rejected for encoding.
    let text: String = buf.iter().map(|&b| b as char).collect();

    let Some(line_end) = text.find(CRLF) else {
        check_partial_request_line(&text)?;
        return Err(ParseError::Incomplete);
    };

    let mut request = Request::default();
    parse_request_line(&text[..line_end], &mut request)?;

    let headers_start = line_end + CRLF.len();
    let Some(head_end) = text.find(HEAD_END) else {
        // Header lines that are already complete can still be rejected.
        let mut lines: Vec<&str> = text[headers_start..].split(CRLF).collect();
        let partial = lines.pop().unwrap_or("");
        for line in lines {
            parse_header_line(line, &mut request)?;
        }
        check_partial_header_line(partial, &mut request)?;
        return Err(ParseError::Incomplete);
    };

    // The request-line's CRLF doubles as the start of HEAD_END when there
    // are no header lines.
    if head_end > line_end {
        for line in text[headers_start..head_end].split(CRLF) {
            parse_header_line(line, &mut request)?;
        }
    }

    Ok(Some(request))
}

fn parse_request_line(line: &str, request: &mut Request) -> Result<(), ParseError> {
    let mut parts = line.split(' ');
    let (Some(method), Some(uri), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequestLine);
    };

    // An empty method still matches; the dispatcher answers it with 400.
    if !method.chars().all(is_token_char) {
        return Err(ParseError::InvalidRequestLine);
    }
    if uri.is_empty() || !uri.chars().all(is_token_char) {
        return Err(ParseError::InvalidRequestLine);
    }
    if !is_http_version(version) {
        return Err(ParseError::InvalidRequestLine);
    }

    request.method = Some(method.to_string());
    request.request_uri = Some(uri.to_string());
    request.http_version = Some(version.to_string());
    Ok(())
}

fn parse_header_line(line: &str, request: &mut Request) -> Result<(), ParseError> {
    if line.contains('\r') || line.contains('\n') {
        return Err(ParseError::InvalidHeader);
    }

    let (name, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
    if name.is_empty() || !name.chars().all(is_token_char) {
        return Err(ParseError::InvalidHeader);
    }

    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    request.set_header(name, value.to_string());
    Ok(())
}

/// Rejects a request-line that has not seen its CRLF yet but can no longer
/// become valid.
fn check_partial_request_line(partial: &str) -> Result<(), ParseError> {
    // A trailing CR only waits for its LF, so the line is already whole.
    if let Some(line) = partial.strip_suffix('\r') {
        let mut scratch = Request::default();
        return parse_request_line(line, &mut scratch);
    }

    let parts: Vec<&str> = partial.split(' ').collect();
    if parts.len() > 3 {
        return Err(ParseError::InvalidRequestLine);
    }
    if !parts.iter().all(|part| part.chars().all(is_token_char)) {
        return Err(ParseError::InvalidRequestLine);
    }
    if parts.len() == 3 && (parts[1].is_empty() || !is_http_version_prefix(parts[2])) {
        return Err(ParseError::InvalidRequestLine);
    }
    Ok(())
}

/// Same as [`check_partial_request_line`] for the header line being read.
fn check_partial_header_line(partial: &str, request: &mut Request) -> Result<(), ParseError> {
    if let Some(line) = partial.strip_suffix('\r') {
        // An empty line here is the start of the blank line ending the head.
        if line.is_empty() {
            return Ok(());
        }
        return parse_header_line(line, request);
    }

    match partial.split_once(':') {
        Some((name, value)) => {
            if name.is_empty() || !name.chars().all(is_token_char) {
                return Err(ParseError::InvalidHeader);
            }
            if value.contains('\r') || value.contains('\n') {
                return Err(ParseError::InvalidHeader);
            }
        }
        None => {
            if !partial.chars().all(is_token_char) {
                return Err(ParseError::InvalidHeader);
            }
        }
    }
    Ok(())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() || (c as u32) > 0x7f
}

fn is_http_version(version: &str) -> bool {
    let Some(rest) = version.strip_prefix("HTTP/") else {
        return false;
    };
    let bytes = rest.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Whether `version` can still grow into `HTTP/<digit>.<digit>`.
fn is_http_version_prefix(version: &str) -> bool {
    const LITERAL: &[u8] = b"HTTP/";
    let bytes = version.as_bytes();
    if bytes.len() > LITERAL.len() + 3 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        0..5 => b == LITERAL[i],
        5 | 7 => b.is_ascii_digit(),
        _ => b == b'.',
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request(req).unwrap().unwrap();

        assert_eq!(parsed.request_uri.as_deref(), Some("/"));
        assert_eq!(parsed.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn version_shape() {
        assert!(is_http_version("HTTP/1.1"));
        assert!(is_http_version("HTTP/2.0"));
        assert!(!is_http_version("HTTP/1.10"));
        assert!(!is_http_version("HTTP/x.1"));
        assert!(!is_http_version("http/1.1"));
    }

    #[test]
    fn version_prefixes() {
        for prefix in ["", "H", "HTTP", "HTTP/", "HTTP/1", "HTTP/1.", "HTTP/1.1"] {
            assert!(is_http_version_prefix(prefix), "{prefix:?}");
        }
        for bad in ["X", "HTTPS", "HTTP/a", "HTTP/1-", "HTTP/1.x", "HTTP/1.10"] {
            assert!(!is_http_version_prefix(bad), "{bad:?}");
        }
    }
}
