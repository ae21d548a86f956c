//! REST API for the document critique service
//!
//! Exposes document upload/analysis and per-reader feedback endpoints for
//! the web UI.

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::ApiError;
pub use models::{AnalyzeResponse, ErrorBody, FeedbackRequest};
pub use server::{build_router, start_http_server, AppState};
