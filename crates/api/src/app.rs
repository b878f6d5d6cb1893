use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lifecover_core::service::{self, ServiceError};
use lifecover_core::storage::SubmissionStore;

const INDEX_HTML: &str = include_str!("../static/index.html");

const SAVE_FAILED: &str = "Failed to save recommendation";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
}

pub fn router(state: AppState, cors_allow_origin: Option<&str>) -> anyhow::Result<Router> {
    let origin = match cors_allow_origin {
        Some(o) => AllowOrigin::exact(
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS_ALLOW_ORIGIN: {o}"))?,
        ),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/recommendation", post(create_recommendation))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Error body shaped `{statusCode, message, error}`; `message` is a list for
/// validation failures and a single string otherwise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: Value,
    error: &'static str,
}

fn error_response(status: StatusCode, message: Value) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message,
        error: status.canonical_reason().unwrap_or("Error"),
    };
    (status, Json(body)).into_response()
}

fn bad_request(messages: Vec<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, Value::from(messages))
}

async fn create_recommendation(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            return bad_request(vec![rejection.body_text()]);
        }
    };

    match service::create_recommendation(state.store.as_ref(), &payload).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(ServiceError::Validation(e)) => {
            tracing::debug!(error = %e, "validation failed");
            bad_request(e.into_messages())
        }
        Err(ServiceError::Storage(e)) => {
            let err = anyhow::Error::new(e);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "error saving submission");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Value::from(SAVE_FAILED),
            )
        }
    }
}
