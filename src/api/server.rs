//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::llm::LlmGateway;

use super::handlers::{self, ApiError};
use super::models::{ErrorBody, FeedbackRequest};

/// Uploads above this size are rejected by the body limit layer
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<LlmGateway>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/feedback", post(feedback_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(gateway: Arc<LlmGateway>, port: u16) -> Result<()> {
    let app = build_router(AppState { gateway });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check().await))
}

/// Analyze an uploaded document
async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        code: "MISSING_FILE".to_string(),
        message: format!("无法读取上传内容：{}", e),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(|e| ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "MISSING_FILE".to_string(),
            message: format!("无法读取上传内容：{}", e),
        })?;

        file = Some((bytes.to_vec(), mime, filename));
        break;
    }

    let response = handlers::run_analysis(&state.gateway, file).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Produce reader feedback for previously extracted text
async fn feedback_handler(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = handlers::run_feedback(&state.gateway, request).await?;
    Ok((StatusCode::OK, Json(feedback)))
}
