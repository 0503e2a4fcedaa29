/// Header names the parser captures. Every other header line is accepted
/// by the grammar and dropped.
pub const RECOGNIZED_HEADERS: [&str; 7] = [
    "Host",
    "Referer",
    "User-Agent",
    "Accept",
    "Accept-Language",
    "Accept-Encoding",
    "Connection",
];

/// Represents a parsed HTTP request from a client.
///
/// `method`, `request_uri` and `http_version` are only set when the
/// request-line matched. Each recognized header is captured independently
/// and is `None` when the client did not send it (or sent it without a value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The method token, exactly as sent (e.g. "GET")
    pub method: Option<String>,
    /// The raw request-URI, path plus query, not percent-decoded
    pub request_uri: Option<String>,
    /// HTTP version token (typically "HTTP/1.1")
    pub http_version: Option<String>,
    pub host: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub accept_language: Option<String>,
    pub accept_encoding: Option<String>,
    pub connection: Option<String>,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.request.request_uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.request.http_version = Some(version.into());
        self
    }

    /// Sets a recognized header. Unknown names are ignored, as the parser does.
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.request.set_header(key, value.into());
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

impl Request {
    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key.to_ascii_lowercase().as_str() {
            "host" => &mut self.host,
            "referer" => &mut self.referer,
            "user-agent" => &mut self.user_agent,
            "accept" => &mut self.accept,
            "accept-language" => &mut self.accept_language,
            "accept-encoding" => &mut self.accept_encoding,
            "connection" => &mut self.connection,
            _ => return None,
        };
        Some(slot)
    }

    /// Stores the value of a recognized header, replacing any earlier value.
    ///
    /// Returns `false` (and stores nothing) when `key` is not one of
    /// [`RECOGNIZED_HEADERS`]. Names are compared case-insensitively.
    pub fn set_header(&mut self, key: &str, value: String) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Retrieves a recognized header value by name (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        let value = match key.to_ascii_lowercase().as_str() {
            "host" => &self.host,
            "referer" => &self.referer,
            "user-agent" => &self.user_agent,
            "accept" => &self.accept,
            "accept-language" => &self.accept_language,
            "accept-encoding" => &self.accept_encoding,
            "connection" => &self.connection,
            _ => return None,
        };
        value.as_deref()
    }

    /// Whether the client asked to keep the connection open.
    ///
    /// True only when the Connection header equals "Keep-Alive", ignoring
    /// case. An absent header means the connection is closed after the
    /// response.
    pub fn is_keep_alive(&self) -> bool {
        self.connection
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("keep-alive"))
            .unwrap_or(false)
    }
}
