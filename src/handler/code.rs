//! `/code` handler
//!
//! Validates the query, runs code generation on the blocking pool and wraps
//! the bytes with their media type.

use crate::codes::{self, CodeError};
use crate::config::AppState;
use crate::handler::params;
use crate::handler::router::RequestContext;
use crate::http::{self, cache};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

pub async fn serve_code(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let request = match params::parse_code_request(ctx.query, &state.config.codes) {
        Ok(r) => r,
        Err(e) => return http::build_error_response(e.status(), &e.to_string()),
    };

    let capabilities = state.capabilities;
    let max_pixels = state.config.codes.max_pixels;
    let result = tokio::task::spawn_blocking(move || {
        codes::generate(&request, &capabilities, max_pixels)
    })
    .await;

    match result {
        Ok(Ok(rendered)) => {
            let etag = cache::generate_etag(&rendered.bytes);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag, cache::CODE_CACHE_CONTROL);
            }
            let media_type = rendered.media_type();
            http::build_content_response(
                Bytes::from(rendered.bytes),
                media_type,
                &etag,
                cache::CODE_CACHE_CONTROL,
            )
        }
        Ok(Err(e)) => code_error_response(&e),
        Err(e) => {
            logger::log_error(&format!("Code generation task failed: {e}"));
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn code_error_response(err: &CodeError) -> Response<Full<Bytes>> {
    let status = err.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        logger::log_error(&err.to_string());
    }
    http::build_error_response(status, &err.to_string())
}
