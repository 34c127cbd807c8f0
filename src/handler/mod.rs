//! Request handler module
//!
//! Routes requests to code generation, the version reporter and the static
//! front-end.

mod code;
mod params;
pub mod router;
mod static_files;
mod version;

// Re-export main entry point
pub use router::handle_request;
