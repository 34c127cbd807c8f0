//! HTTP protocol layer module
//!
//! Protocol helpers shared by the code, version and static asset handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_414_response,
    build_content_response, build_error_response, build_json_response, build_options_response,
};
