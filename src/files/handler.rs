use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::files::listing::render_index;
use crate::files::mime::guess_content_type;
use crate::http::dispatcher::Handler;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Serves files and directory listings below a document root.
#[derive(Debug, Clone)]
pub struct FilesystemHandler {
    root: PathBuf,
}

impl FilesystemHandler {
    /// The method this handler is registered under.
    pub const METHOD: &'static str = "GET";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn serve(&self, uri: &str, host: Option<&str>) -> Response {
        if !uri.starts_with('/') {
            return Response::forbidden(uri);
        }

        let Some(path) = decode_path(uri) else {
            return Response::forbidden(uri);
        };
        let url_path = path.to_string_lossy().into_owned();

        let Ok(relative) = path.strip_prefix("/") else {
            return Response::forbidden(&url_path);
        };

        let mut hidden = false;
        for component in relative.components() {
            match component {
                Component::Normal(name) => hidden |= name.to_string_lossy().starts_with('.'),
                Component::CurDir => {}
                _ => return Response::forbidden(&url_path),
            }
        }
        if hidden {
            return Response::not_found(&url_path);
        }

        let resource = self.root.join(relative);
        let metadata = match fs::metadata(&resource) {
            Ok(metadata) => metadata,
            Err(e) => return error_response(&e, &url_path),
        };

        let result = if metadata.is_file() {
            serve_file(&resource)
        } else if metadata.is_dir() {
            render_index(&resource, &url_path, host).map(|html| {
                ResponseBuilder::new(StatusCode::Ok)
                    .header("Content-Type", "text/html; charset=utf-8")
                    .body(html)
                    .build()
            })
        } else {
            return Response::forbidden(&url_path);
        };

        result.unwrap_or_else(|e| error_response(&e, &url_path))
    }
}

impl Handler for FilesystemHandler {
    fn handle(&self, request: &Request) -> Option<Response> {
        let uri = request.request_uri.as_deref().unwrap_or_default();
        Some(self.serve(uri, request.host.as_deref()))
    }
}

/// Resolves the path part of a request-URI: query and fragment are dropped,
/// dot segments removed and percent-escapes decoded.
fn decode_path(uri: &str) -> Option<PathBuf> {
    let base = Url::parse("file:///").ok()?;
    base.join(uri).ok()?.to_file_path().ok()
}

fn serve_file(path: &Path) -> io::Result<Response> {
    let contents = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", guess_content_type(&name, &contents))
        .body(contents)
        .build())
}

fn error_response(e: &io::Error, url_path: &str) -> Response {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput => {
            Response::not_found(url_path)
        }
        io::ErrorKind::PermissionDenied => Response::forbidden(url_path),
        _ => {
            tracing::error!(path = url_path, error = %e, "Failed to read resource");
            Response::internal_error()
        }
    }
}
