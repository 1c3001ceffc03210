//! Static file serving module
//!
//! Maps URL paths onto the served directory, loads files, renders directory
//! listings and builds the base responses. Content-Type selection is delegated
//! to the active [`ResponsePolicy`].

use crate::handler::policy::ResponsePolicy;
use crate::http::{self, cache, FileHeaders, RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::borrow::Cow;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Request details the file handler needs
pub struct FileRequest<'a> {
    /// Raw (still percent-encoded) URL path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    /// `If-None-Match` takes precedence over `If-Modified-Since`
    pub has_if_none_match: bool,
    pub range: Option<&'a str>,
}

impl<'a> FileRequest<'a> {
    /// Plain GET for `path`
    pub const fn get(path: &'a str) -> Self {
        Self {
            path,
            query: None,
            is_head: false,
            if_modified_since: None,
            has_if_none_match: false,
            range: None,
        }
    }
}

/// Static file handler rooted at one directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_files: Vec<String>,
    directory_listing: bool,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, index_files: Vec<String>, directory_listing: bool) -> Self {
        Self {
            root: root.into(),
            index_files,
            directory_listing,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path onto the filesystem
    ///
    /// The path is percent-decoded and split on `/`. Empty, `.` and `..`
    /// segments are dropped, as is anything that is not a single plain file name
    /// on this platform, so the result never leaves the root. A trailing slash
    /// is preserved.
    pub fn translate_path(&self, url_path: &str) -> PathBuf {
        let decoded = urlencoding::decode(url_path).unwrap_or(Cow::Borrowed(url_path));

        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            let mut components = Path::new(segment).components();
            if let (Some(Component::Normal(name)), None) = (components.next(), components.next()) {
                path.push(name);
            }
        }

        if decoded.ends_with('/') {
            path.push("");
        }
        path
    }

    /// Serve a GET/HEAD request
    pub async fn serve<P: ResponsePolicy + ?Sized>(
        &self,
        req: &FileRequest<'_>,
        policy: &P,
    ) -> Response<Full<Bytes>> {
        let path = self.translate_path(req.path);
        let has_trailing_slash = req.path.ends_with('/');

        let Ok(metadata) = fs::metadata(&path).await else {
            return http::build_404_response(req.is_head);
        };

        if metadata.is_dir() {
            if !has_trailing_slash {
                return http::build_moved_permanently(&directory_redirect(req.path, req.query));
            }
            if let Some(index) = self.find_index(&path).await {
                return serve_file(&index, req, policy).await;
            }
            if self.directory_listing {
                return list_directory(&path, req).await;
            }
            return http::build_404_response(req.is_head);
        }

        if has_trailing_slash {
            return http::build_404_response(req.is_head);
        }
        serve_file(&path, req, policy).await
    }

    async fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        for name in &self.index_files {
            let candidate = dir.join(name);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                return Some(candidate);
            }
        }
        None
    }
}

/// `Location` for a directory requested without its trailing slash
fn directory_redirect(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{path}/?{q}"),
        None => format!("{path}/"),
    }
}

async fn serve_file<P: ResponsePolicy + ?Sized>(
    path: &Path,
    req: &FileRequest<'_>,
    policy: &P,
) -> Response<Full<Bytes>> {
    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!("Failed to read '{}': {e}", path.display()));
            return http::build_404_response(req.is_head);
        }
    };

    let last_modified = fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .ok();

    if let Some(modified) = last_modified {
        if !req.has_if_none_match && cache::not_modified_since(req.if_modified_since, modified) {
            return http::build_304_response(&cache::http_date(modified));
        }
    }

    let last_modified = last_modified.map(cache::http_date);
    let headers = FileHeaders {
        content_type: policy.content_type(path),
        last_modified: last_modified.as_deref(),
    };
    let total_size = content.len();

    match http::parse_range_header(req.range, total_size) {
        RangeParseResult::Satisfiable(range) => {
            let slice = Bytes::copy_from_slice(&content[range.start..=range.end]);
            http::build_partial_response(slice, &headers, &range.content_range(total_size), req.is_head)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::Ignored => {
            http::build_file_response(Bytes::from(content), &headers, req.is_head)
        }
    }
}

/// Render an HTML index of `dir`
async fn list_directory(dir: &Path, req: &FileRequest<'_>) -> Response<Full<Bytes>> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) => {
            logger::log_warning(&format!("Cannot list '{}': {e}", dir.display()));
            return http::build_404_response(req.is_head);
        }
    };

    let mut entries = Vec::new();
    while let Ok(Some(entry)) = reader.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name,
            is_dir,
            is_symlink,
        });
    }
    entries.sort_by_key(|e| e.name.to_lowercase());

    let display_path = urlencoding::decode(req.path).unwrap_or(Cow::Borrowed(req.path));
    http::build_html_response(render_listing(&display_path, &entries), req.is_head)
}

struct ListingEntry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );

    for entry in entries {
        let (mut label, mut href) = (entry.name.clone(), urlencoding::encode(&entry.name).into_owned());
        if entry.is_dir {
            label.push('/');
            href.push('/');
        }
        if entry.is_symlink {
            label.push('@');
        }
        let _ = writeln!(html, "<li><a href=\"{href}\">{}</a></li>", escape_html(&label));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::policy::{DefaultPolicy, PwaPolicy};
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_TYPE, LAST_MODIFIED, LOCATION};

    fn site() -> (tempfile::TempDir, StaticFiles) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("manifest.json"), "{\"name\":\"SC\"}").unwrap();
        std::fs::write(dir.path().join("data.bin"), b"0123456789").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("assets/a <b>.txt"), "x").unwrap();
        let files = StaticFiles::new(
            dir.path(),
            vec!["index.html".to_string(), "index.htm".to_string()],
            true,
        );
        (dir, files)
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_translate_path_stays_under_root() {
        let files = StaticFiles::new("/srv/app", Vec::new(), true);
        assert_eq!(files.translate_path("/a/b.txt"), PathBuf::from("/srv/app/a/b.txt"));
        assert_eq!(
            files.translate_path("/../../etc/passwd"),
            PathBuf::from("/srv/app/etc/passwd")
        );
        assert_eq!(
            files.translate_path("/%2e%2e/secret"),
            PathBuf::from("/srv/app/secret")
        );
        assert_eq!(
            files.translate_path("/my%20file.txt"),
            PathBuf::from("/srv/app/my file.txt")
        );
        assert!(files.translate_path("/assets/").to_string_lossy().ends_with('/'));
    }

    #[tokio::test]
    async fn test_serves_file_with_policy_content_type() {
        let (_dir, files) = site();
        let resp = files.serve(&FileRequest::get("/manifest.json"), &PwaPolicy).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/manifest+json");
        assert!(resp.headers().contains_key(LAST_MODIFIED));
        assert_eq!(body_of(resp).await, "{\"name\":\"SC\"}");

        let resp = files.serve(&FileRequest::get("/manifest.json"), &DefaultPolicy).await;
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let (_dir, files) = site();
        let resp = files.serve(&FileRequest::get("/nope.html"), &PwaPolicy).await;
        assert_eq!(resp.status(), 404);
        let resp = files.serve(&FileRequest::get("/index.html/"), &PwaPolicy).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_directory_index_and_redirect() {
        let (_dir, files) = site();
        let resp = files.serve(&FileRequest::get("/"), &PwaPolicy).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_of(resp).await, "<h1>home</h1>");

        let mut req = FileRequest::get("/assets");
        req.query = Some("v=1");
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 301);
        assert_eq!(resp.headers()[LOCATION], "/assets/?v=1");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let (_dir, files) = site();
        let resp = files.serve(&FileRequest::get("/assets/"), &PwaPolicy).await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(body_of(resp).await.to_vec()).unwrap();
        assert!(body.contains("<title>Directory listing for /assets/</title>"));
        assert!(body.contains("<a href=\"app.js\">app.js</a>"));
        assert!(body.contains("<a href=\"a%20%3Cb%3E.txt\">a &lt;b&gt;.txt</a>"));

        let no_listing = StaticFiles::new(files.root(), Vec::new(), false);
        let resp = no_listing.serve(&FileRequest::get("/assets/"), &PwaPolicy).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_dir, files) = site();
        let mut req = FileRequest::get("/data.bin");
        req.is_head = true;
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "10");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_range_requests() {
        let (_dir, files) = site();
        let mut req = FileRequest::get("/data.bin");
        req.range = Some("bytes=2-4");
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-range"], "bytes 2-4/10");
        assert_eq!(body_of(resp).await, "234");

        req.range = Some("bytes=50-");
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 416);
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let (_dir, files) = site();
        let mut req = FileRequest::get("/data.bin");
        req.if_modified_since = Some("Fri, 31 Dec 9999 23:59:59 GMT");
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 304);

        req.has_if_none_match = true;
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 200);

        req.has_if_none_match = false;
        req.if_modified_since = Some("Thu, 01 Jan 1970 00:00:00 GMT");
        let resp = files.serve(&req, &PwaPolicy).await;
        assert_eq!(resp.status(), 200);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#x27;");
    }
}
