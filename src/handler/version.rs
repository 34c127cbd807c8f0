//! Version reporter

use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build version reported by `GET /version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
}

pub fn serve_version() -> Response<Full<Bytes>> {
    http::build_json_response(StatusCode::OK, &VersionInfo { version: VERSION })
}
