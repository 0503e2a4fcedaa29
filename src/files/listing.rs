//! HTML directory listings in the style of classic Apache indexes.

use std::fs;
use std::io;
use std::path::Path;

use url::Url;

const DOCTYPE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">";

struct Entry {
    name: String,
    is_dir: bool,
}

/// Renders the listing of `dir`, which is served at the URL path `url_path`.
///
/// Directories come first, then files, each group sorted by name. Hidden
/// entries are left out. When `host` is given (the request's Host header) a
/// server address footer is added.
pub fn render_index(dir: &Path, url_path: &str, host: Option<&str>) -> io::Result<String> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        entries.push(Entry {
            name,
            is_dir: entry.path().is_dir(),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let mut html = String::new();
    html.push_str(DOCTYPE);
    html.push('\n');
    html.push_str("<html>\n");
    html.push_str(&format!(
        "<head>\n<title>Index of {}</title>\n</head>\n",
        escape(url_path)
    ));
    html.push_str("<body>\n");
    html.push_str(&format!("<h1>Index of {}</h1>\n", escape(url_path)));

    html.push_str("<table>\n");
    html.push_str("<tr><th>Name</th></tr>\n");
    html.push_str("<tr><th><hr></th></tr>\n");

    let base = directory_url(url_path)?;
    if url_path != "/" {
        render_row(&mut html, &parent_href(&base), "Parent Directory");
    }

    for entry in &entries {
        let label = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        render_row(&mut html, &child_href(&base, &entry.name, entry.is_dir), &label);
    }

    html.push_str("<tr><th><hr></th></tr>\n");
    html.push_str("</table>\n");

    if let Some(host) = host {
        render_address(&mut html, host);
    }

    html.push_str("</body>\n");
    html.push_str("</html>\n");
    Ok(html)
}

fn render_row(html: &mut String, href: &str, label: &str) {
    html.push_str(&format!(
        "<tr><td><a href=\"{}\">{}</a></td></tr>\n",
        escape(href),
        escape(label)
    ));
}

fn render_address(html: &mut String, host: &str) {
    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(port))
        }
        _ => (host, None),
    };

    html.push_str("<address>Web Server at ");
    html.push_str(&escape(name));
    if let Some(port) = port {
        html.push_str(" Port ");
        html.push_str(port);
    }
    html.push_str("</address>\n");
}

/// The decoded `url_path` as an URL whose segments are percent-encoded.
fn directory_url(url_path: &str) -> io::Result<Url> {
    let mut url = Url::parse("http://localhost/").map_err(io::Error::other)?;
    url.path_segments_mut()
        .map_err(|()| io::Error::other("listing base URL cannot hold a path"))?
        .clear()
        .extend(url_path.split('/').skip(1));
    Ok(url)
}

/// `/a/b/` and `/a/b` both have the parent `/a/`.
fn parent_href(base: &Url) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().pop().push("");
    }
    url.path().to_string()
}

fn child_href(base: &Url, name: &str, is_dir: bool) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(name);
        if is_dir {
            segments.push("");
        }
    }
    url.path().to_string()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
