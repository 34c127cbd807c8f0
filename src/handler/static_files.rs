//! Static file serving module
//!
//! Serves the bundled front-end. Paths that match no file fall back to the
//! asset directory's index document.

use crate::config::AssetsConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Outcome of resolving a request path against the asset directory
#[derive(Debug, PartialEq, Eq)]
enum Resolved {
    File(PathBuf),
    /// No such file; serve the index document instead
    Fallback,
    /// Path escapes the asset directory
    Forbidden,
}

/// Serve a static asset or the index document
pub async fn serve_asset(ctx: &RequestContext<'_>, assets: &AssetsConfig) -> Response<Full<Bytes>> {
    let root = match Path::new(&assets.dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                assets.dir
            ));
            return http::build_404_response();
        }
    };

    let Ok(path) = percent_decode_str(ctx.path).decode_utf8() else {
        return http::build_404_response();
    };

    let file = match resolve(&root, &path, &assets.index_files) {
        Resolved::File(file) => file,
        Resolved::Fallback => match find_index(&root, &assets.index_files) {
            Some(index) => index,
            None => return http::build_404_response(),
        },
        Resolved::Forbidden => {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
            return http::build_404_response();
        }
    };

    let content = match fs::read(&file).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", file.display()));
            return http::build_404_response();
        }
    };

    let content_type = mime::content_type_for(&file);
    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag, cache::ASSET_CACHE_CONTROL);
    }
    http::build_content_response(
        Bytes::from(content),
        content_type,
        &etag,
        cache::ASSET_CACHE_CONTROL,
    )
}

/// Map a request path onto a file below `root` (already canonical)
fn resolve(root: &Path, path: &str, index_files: &[String]) -> Resolved {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Resolved::Forbidden;
    }

    let mut candidate = root.join(relative);
    if candidate.is_dir() {
        match index_files
            .iter()
            .map(|index| candidate.join(index))
            .find(|p| p.is_file())
        {
            Some(index) => candidate = index,
            None => return Resolved::Fallback,
        }
    }

    // Missing files are the common case and fall back without logging
    let Ok(canonical) = candidate.canonicalize() else {
        return Resolved::Fallback;
    };
    if !canonical.starts_with(root) {
        return Resolved::Forbidden;
    }
    if canonical.is_file() {
        Resolved::File(canonical)
    } else {
        Resolved::Fallback
    }
}

fn find_index(root: &Path, index_files: &[String]) -> Option<PathBuf> {
    index_files
        .iter()
        .map(|index| root.join(index))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_files() -> Vec<String> {
        vec!["index.html".to_string()]
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        std::fs::write(dir.path().join("my file.css"), "p{}").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<html>docs</html>").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            resolve(&root, "/app.js", &index_files()),
            Resolved::File(root.join("app.js"))
        );
    }

    #[test]
    fn test_resolve_directory_index() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            resolve(&root, "/", &index_files()),
            Resolved::File(root.join("index.html"))
        );
        assert_eq!(
            resolve(&root, "/docs/", &index_files()),
            Resolved::File(root.join("docs/index.html"))
        );
    }

    #[test]
    fn test_resolve_missing_falls_back() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(resolve(&root, "/nope.css", &index_files()), Resolved::Fallback);
        assert_eq!(resolve(&root, "/empty", &index_files()), Resolved::Fallback);
    }

    #[test]
    fn test_resolve_traversal_forbidden() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            resolve(&root, "/../etc/passwd", &index_files()),
            Resolved::Forbidden
        );
        assert_eq!(
            resolve(&root, "/docs/../../x", &index_files()),
            Resolved::Forbidden
        );
    }

    fn context(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            query: None,
            if_none_match: None,
        }
    }

    fn assets(dir: &tempfile::TempDir) -> AssetsConfig {
        AssetsConfig {
            dir: dir.path().to_str().unwrap().to_string(),
            index_files: index_files(),
        }
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        use http_body_util::BodyExt;
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = fixture();
        let resp = serve_asset(&context("/my%20file.css"), &assets(&dir)).await;
        assert_eq!(resp.headers()["content-type"], "text/css; charset=utf-8");
        assert_eq!(&body_of(resp).await[..], b"p{}");
    }

    #[tokio::test]
    async fn test_encoded_traversal_blocked() {
        let dir = fixture();
        let resp = serve_asset(&context("/%2e%2e/%2e%2e/etc/passwd"), &assets(&dir)).await;
        assert_eq!(resp.status(), hyper::StatusCode::NOT_FOUND);

        let resp = serve_asset(&context("/%FF%FE"), &assets(&dir)).await;
        assert_eq!(resp.status(), hyper::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_find_index() {
        let dir = fixture();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(find_index(&root, &index_files()), Some(root.join("index.html")));
        assert_eq!(find_index(&root, &["default.htm".to_string()]), None);
    }
}
