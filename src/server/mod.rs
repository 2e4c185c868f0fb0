//! HTTP front end for the extraction pipeline.
//!
//! Two routes:
//!
//! * `GET /` — a bare HTML upload form for humans.
//! * `POST /extract-warranty-info` — multipart field `file`, answers JSON.
//!
//! Handlers share one immutable [`AppState`] (config + extractor) through
//! axum's `State`; each request is otherwise independent.

pub mod placeholder;

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extract::extract;
use crate::pipeline::llm::{resolve_extractor, DocumentExtractor};
use crate::pipeline::persist::ensure_output_dir;
use crate::pipeline::upload::Document;
use crate::record::{ExtractionOutput, WarrantyRecord};
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        DefaultBodyLimit, State,
    },
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Extra room for multipart boundaries and headers on top of the file limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const UPLOAD_FORM: &str = r#"<!doctype html>
<title>Warranty Extractor</title>
<h1>Upload Warranty File (Image or PDF)</h1>
<form method="POST" action="/extract-warranty-info" enctype="multipart/form-data">
    <input type="file" name="file" required>
    <button type="submit">Upload</button>
</form>
"#;

/// State shared by every request handler.
pub struct AppState {
    pub config: ExtractionConfig,
    pub extractor: Arc<dyn DocumentExtractor>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Resolve the extractor and create the output directory.
    ///
    /// Runs once at startup so a missing API key or unwritable output
    /// directory fails the process instead of the first request.
    pub async fn new(config: ExtractionConfig) -> Result<Self, ExtractError> {
        let extractor = resolve_extractor(&config)?;
        ensure_output_dir(&config.output_dir).await?;
        Ok(Self { config, extractor })
    }
}

/// Build the extraction router.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    let body_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(upload_form))
        .route("/extract-warranty-info", post(extract_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer allowing `origin`, or any origin when `None` / `"*"`.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ExtractError> {
    let allow_origin = match origin.map(str::trim) {
        None | Some("") | Some("*") => AllowOrigin::any(),
        Some(o) => AllowOrigin::exact(HeaderValue::from_str(o).map_err(|e| {
            ExtractError::InvalidConfig(format!("Invalid CORS origin '{o}': {e}"))
        })?),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Bind `addr` and serve `app` until Ctrl-C.
pub async fn serve(addr: &str, app: Router) -> Result<(), ExtractError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ExtractError::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExtractError::Internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn extract_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessBody>, ExtractError> {
    let document = read_file_part(multipart).await?;
    let output = extract(&document, state.extractor.as_ref(), &state.config).await?;
    Ok(Json(SuccessBody::from(output)))
}

/// Pull the `file` part out of the multipart body.
///
/// Parts that are not named `file`, or that carry no filename (plain form
/// fields), are skipped.
async fn read_file_part(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Document, ExtractError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!("Request is not a multipart upload: {}", rejection);
            return Err(ExtractError::NoFileUploaded);
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ExtractError::NoFileUploaded),
            Err(e) => return Err(upload_failed(e)),
        };

        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(upload_failed)?;

        return Document::from_upload(Some(&filename), content_type.as_deref(), bytes.to_vec());
    }
}

fn upload_failed(e: axum::extract::multipart::MultipartError) -> ExtractError {
    ExtractError::UploadFailed {
        status: e.status().as_u16(),
        message: e.body_text(),
    }
}

// ── Response bodies ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct SuccessBody {
    status: &'static str,
    file_saved: String,
    data: WarrantyRecord,
}

impl From<ExtractionOutput> for SuccessBody {
    fn from(output: ExtractionOutput) -> Self {
        Self {
            status: "success",
            file_saved: output.file_saved.display().to_string(),
            data: output.data,
        }
    }
}

#[derive(Serialize)]
struct ClientErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ServerErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_output: Option<String>,
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_client_error() {
            debug!("Rejected upload: {}", self);
            let body = ClientErrorBody {
                error: self.to_string(),
            };
            return (status, Json(body)).into_response();
        }

        warn!("Extraction failed: {}", self);
        let body = ServerErrorBody {
            status: "error",
            message: self.to_string(),
            raw_output: self.raw_output().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
