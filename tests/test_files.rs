use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use docserve::files::FilesystemHandler;
use docserve::files::listing::render_index;
use docserve::files::mime::{FALLBACK_MIME_TYPE, from_extension, guess_content_type};
use docserve::http::dispatcher::Handler;
use docserve::http::request::RequestBuilder;
use docserve::http::response::{Response, StatusCode};

static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

/// A throwaway document root:
///
/// ```text
/// a/aa/aafile1        plain text, no extension
/// a/aa/aafile2.jpg
/// a/aa/aafile3.gif
/// a/aa/aafile4        binary, no extension
/// a/aa/sub/
/// a/aa/.hidden
/// index.html
/// ```
struct DocRoot(PathBuf);

impl DocRoot {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!(
            "docserve-test-{}-{}",
            std::process::id(),
            NEXT_ROOT.fetch_add(1, Ordering::SeqCst)
        ));
        let aa = root.join("a").join("aa");
        fs::create_dir_all(aa.join("sub")).unwrap();
        fs::write(aa.join("aafile1"), "just some text\n").unwrap();
        fs::write(aa.join("aafile2.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();
        fs::write(aa.join("aafile3.gif"), b"GIF89a").unwrap();
        fs::write(aa.join("aafile4"), [0u8, 1, 2, 3, 0xfe]).unwrap();
        fs::write(aa.join(".hidden"), "secret").unwrap();
        fs::write(root.join("index.html"), "<html>home</html>").unwrap();
        DocRoot(root)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn get(&self, uri: &str) -> Response {
        let request = RequestBuilder::new()
            .method("GET")
            .uri(uri)
            .version("HTTP/1.1")
            .header("Host", "127.0.0.1:31337")
            .build();
        FilesystemHandler::new(self.path()).handle(&request).unwrap()
    }
}

impl Drop for DocRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn body(response: &Response) -> String {
    String::from_utf8_lossy(&response.body).into_owned()
}

#[test]
fn test_serves_file_with_content_type() {
    let root = DocRoot::new();
    let response = root.get("/index.html");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert_eq!(body(&response), "<html>home</html>");
}

#[test]
fn test_query_string_is_ignored() {
    let root = DocRoot::new();
    let response = root.get("/index.html?v=2");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(body(&response), "<html>home</html>");
}

#[test]
fn test_percent_encoded_path_is_decoded() {
    let root = DocRoot::new();
    fs::write(root.path().join("my file.txt"), "spaced").unwrap();

    let response = root.get("/my%20file.txt");
    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(body(&response), "spaced");
}

#[test]
fn test_missing_file_is_not_found() {
    let root = DocRoot::new();
    let response = root.get("/nope.txt");

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(body(&response).contains("/nope.txt"));
}

#[test]
fn test_hidden_file_is_not_found() {
    let root = DocRoot::new();
    let response = root.get("/a/aa/.hidden");

    assert_eq!(response.status, StatusCode::NotFound);
}

#[test]
fn test_relative_uri_is_forbidden() {
    let root = DocRoot::new();
    let response = root.get("index.html");

    assert_eq!(response.status, StatusCode::Forbidden);
    assert!(body(&response).contains("index.html"));
}

#[test]
fn test_encoded_traversal_is_forbidden() {
    let root = DocRoot::new();
    let response = root.get("/..%2F..%2Fetc%2Fpasswd");

    assert_eq!(response.status, StatusCode::Forbidden);
}

#[test]
fn test_dot_segments_stay_inside_root() {
    let root = DocRoot::new();
    let response = root.get("/../../index.html");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(body(&response), "<html>home</html>");
}

#[test]
fn test_directory_gets_listing() {
    let root = DocRoot::new();
    let response = root.get("/a/aa");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));

    let html = body(&response);
    assert!(html.contains("<title>Index of /a/aa</title>"));
    assert!(html.contains("<a href=\"/a/\">Parent Directory</a>"));
    assert!(html.contains("<a href=\"/a/aa/sub/\">sub/</a>"));
    assert!(html.contains("<a href=\"/a/aa/aafile1\">aafile1</a>"));
    assert!(!html.contains(".hidden"));
    assert!(html.contains("<address>Web Server at 127.0.0.1 Port 31337</address>"));
}

#[test]
fn test_listing_sorts_directories_first() {
    let root = DocRoot::new();
    let html = render_index(&root.path().join("a").join("aa"), "/a/aa/", None).unwrap();

    let sub = html.find("sub/").unwrap();
    let names: Vec<usize> = ["aafile1", "aafile2.jpg", "aafile3.gif", "aafile4"]
        .iter()
        .map(|name| html.find(&format!(">{}<", name)).unwrap())
        .collect();

    assert!(names.iter().all(|&pos| pos > sub));
    assert!(names.windows(2).all(|w| w[0] < w[1]));
    assert!(!html.contains("<address>"));
}

#[test]
fn test_root_listing_has_no_parent_link() {
    let root = DocRoot::new();
    let html = render_index(root.path(), "/", Some("localhost")).unwrap();

    assert!(html.starts_with("<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n"));
    assert!(!html.contains("Parent Directory"));
    assert!(html.contains("<a href=\"/a/\">a/</a>"));
    assert!(html.contains("<a href=\"/index.html\">index.html</a>"));
    assert!(html.contains("<address>Web Server at localhost</address>"));
}

#[test]
fn test_listing_links_are_percent_encoded() {
    let root = DocRoot::new();
    let dir = root.path().join("my dir#1").join("sub");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("a b?.txt"), "x").unwrap();

    let html = render_index(&dir, "/my dir#1/sub", None).unwrap();

    assert!(html.contains("<a href=\"/my%20dir%231/\">Parent Directory</a>"));
    assert!(html.contains("<a href=\"/my%20dir%231/sub/a%20b%3F.txt\">a b?.txt</a>"));
    assert!(!html.contains("href=\"/my dir"));
}

#[test]
fn test_listing_escapes_names() {
    let root = DocRoot::new();
    fs::write(root.path().join("a&b.txt"), "x").unwrap();

    let html = render_index(root.path(), "/", None).unwrap();
    assert!(html.contains(">a&amp;b.txt<"));
}

#[test]
fn test_media_types_are_recognised() {
    let root = DocRoot::new();

    assert_eq!(root.get("/a/aa/aafile1").header("Content-Type"), Some("text/plain"));
    assert_eq!(root.get("/a/aa/aafile2.jpg").header("Content-Type"), Some("image/jpeg"));
    assert_eq!(root.get("/a/aa/aafile3.gif").header("Content-Type"), Some("image/gif"));
    assert_eq!(
        root.get("/a/aa/aafile4").header("Content-Type"),
        Some(FALLBACK_MIME_TYPE)
    );
}

#[test]
fn test_guess_content_type_by_extension() {
    assert_eq!(from_extension("style.CSS"), Some("text/css"));
    assert_eq!(from_extension("archive.tar.gz"), Some("application/gzip"));
    assert_eq!(from_extension("README"), None);
    assert_eq!(guess_content_type("data.json", b"\0\0"), "application/json");
}

#[test]
fn test_guess_content_type_by_contents() {
    assert_eq!(guess_content_type("notes", "héllo wörld".as_bytes()), "text/plain");
    assert_eq!(guess_content_type("blob", &[0x00, 0x10]), FALLBACK_MIME_TYPE);
    assert_eq!(guess_content_type("empty", b""), FALLBACK_MIME_TYPE);
    assert_eq!(guess_content_type("latin1", &[b'c', b'a', b'f', 0xe9]), FALLBACK_MIME_TYPE);
}
