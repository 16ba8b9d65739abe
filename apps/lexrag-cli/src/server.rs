//! HTTP front end.
//!
//! The [`RagService`] lives on one dedicated OS thread; handlers send it jobs
//! over a bounded channel and await the reply, so queries run one at a time
//! and the blocking embedding/generation calls never stall the async runtime.
//! When the queue is full new queries are refused with 503.
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use lexrag_answer::RagService;
use lexrag_core::RagResponse;

use crate::render;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn from_query_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<lexrag_core::Error>() {
            Some(lexrag_core::Error::InvalidArgument(msg)) => {
                ApiError::BadRequest(msg.clone())
            }
            _ => ApiError::Internal(format!("{err:#}")),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Reply side of a queued query.
pub type PendingAnswer = oneshot::Receiver<anyhow::Result<RagResponse>>;

struct QueryJob {
    query: String,
    reply: oneshot::Sender<anyhow::Result<RagResponse>>,
}

/// Cloneable handle to the query worker thread.
#[derive(Clone)]
pub struct QueryWorker {
    tx: mpsc::Sender<QueryJob>,
}

impl QueryWorker {
    /// Move `service` onto a new thread that holds at most `queue_capacity`
    /// waiting queries besides the one it is answering. The thread exits once
    /// every handle has been dropped.
    pub fn spawn(
        service: RagService,
        queue_capacity: usize,
    ) -> std::io::Result<(Self, JoinHandle<()>)> {
        let (tx, mut rx) = mpsc::channel::<QueryJob>(queue_capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("lexrag-query".into())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    let result = service.ask(&job.query);
                    if let Err(e) = &result {
                        error!("query failed: {e:#}");
                    }
                    let _ = job.reply.send(result);
                }
                info!("query worker stopped");
            })?;
        Ok((Self { tx }, handle))
    }

    /// Queue `query` without waiting for room; a full queue is refused.
    pub fn submit(&self, query: &str) -> Result<PendingAnswer, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::BadRequest("query must not be empty".into()));
        }
        let (reply, rx) = oneshot::channel();
        let job = QueryJob {
            query: query.to_string(),
            reply,
        };
        match self.tx.try_send(job) {
            Ok(()) => Ok(rx),
            Err(TrySendError::Full(_)) => {
                warn!("query queue full; refusing request");
                Err(ApiError::ServiceUnavailable)
            }
            Err(TrySendError::Closed(_)) => Err(ApiError::ServiceUnavailable),
        }
    }

    pub async fn ask(&self, query: &str) -> Result<RagResponse, ApiError> {
        let pending = self.submit(query)?;
        let result = pending.await.map_err(|_| ApiError::ServiceUnavailable)?;
        result.map_err(|e| ApiError::from_query_error(&e))
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

pub async fn index_page() -> Html<String> {
    Html(render::form_page())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn ask_form(
    State(worker): State<QueryWorker>,
    Form(req): Form<AskRequest>,
) -> Response {
    match worker.ask(&req.query).await {
        Ok(response) => Html(render::answer_page(&req.query, &response)).into_response(),
        Err(e) => {
            let page = render::error_page(&req.query, &e.to_string());
            (e.status(), Html(page)).into_response()
        }
    }
}

pub async fn ask_json(
    State(worker): State<QueryWorker>,
    Json(req): Json<AskRequest>,
) -> Result<Json<RagResponse>, ApiError> {
    Ok(Json(worker.ask(&req.query).await?))
}

pub fn router(worker: QueryWorker) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/ask", post(ask_form))
        .route("/api/ask", post(ask_json))
        .route("/health", get(health))
        .with_state(worker)
}
