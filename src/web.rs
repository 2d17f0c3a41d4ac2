use crate::{
    app::{AppError, Indexer},
    semantic::{clamp_limit, BookmarkHit, SemanticSearchService},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;

#[derive(Clone)]
pub struct SharedState {
    service: SemanticSearchService,
    indexer: Arc<Indexer>,
}

impl SharedState {
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self {
            service: indexer.service().clone(),
            indexer,
        }
    }
}

pub fn router(state: SharedState, static_dir: &str) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/similar", get(similar))
        .route("/api/status", get(status))
        .route("/api/reindex", post(reindex))
        .fallback_service(tower_http::services::ServeDir::new(static_dir))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                log::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("shutting down");
}

/// Run `indexer` every `interval`, skipping the immediate first tick.
async fn periodic_reindex(indexer: Arc<Indexer>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        log::info!("periodic re-index starting");
        spawn_index_run(indexer.clone());
    }
}

fn spawn_index_run(indexer: Arc<Indexer>) {
    tokio::task::spawn_blocking(move || match indexer.run() {
        Ok(report) => log::info!("re-index finished: {report:?}"),
        Err(AppError::IndexInProgress) => log::info!("re-index skipped, a run is in progress"),
        Err(err) => log::error!("re-index failed: {err}"),
    });
}

async fn start_app(
    state: SharedState,
    port: u16,
    static_dir: String,
    reindex_interval: Option<Duration>,
) -> anyhow::Result<()> {
    if let Some(interval) = reindex_interval {
        tokio::spawn(periodic_reindex(state.indexer.clone(), interval));
    }

    let app = router(state, &static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Blocks until the server is shut down.
pub fn start_daemon(
    indexer: Arc<Indexer>,
    port: u16,
    static_dir: String,
    reindex_interval: Option<Duration>,
) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(
            SharedState::new(indexer),
            port,
            static_dir,
            reindex_interval,
        ))
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::IndexInProgress => StatusCode::CONFLICT,
            _ => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Missing, unparsable and non-positive limits become 0, the store's "use the default".
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(clamp_limit)
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<BookmarkHit>,
    total: usize,
}

async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, HttpError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("missing query parameter 'q'".to_string()).into());
    }

    let limit = parse_limit(params.limit.as_deref());

    let service = state.service.clone();
    tokio::task::block_in_place(move || -> Result<Json<SearchResponse>, HttpError> {
        let results: Vec<BookmarkHit> = service
            .search(&query, limit)?
            .into_iter()
            .map(BookmarkHit::from)
            .collect();

        Ok(Json(SearchResponse {
            total: results.len(),
            query,
            results,
        }))
    })
}

#[derive(Debug, Deserialize)]
struct SimilarParams {
    id: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct SimilarResponse {
    id: u64,
    results: Vec<BookmarkHit>,
    total: usize,
}

async fn similar(
    State(state): State<SharedState>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<SimilarResponse>, HttpError> {
    let id = params
        .id
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| AppError::BadRequest("missing or invalid parameter 'id'".to_string()))?;

    let limit = parse_limit(params.limit.as_deref());

    let results: Vec<BookmarkHit> = state
        .service
        .find_similar(id, limit)?
        .into_iter()
        .map(BookmarkHit::from)
        .collect();

    Ok(Json(SimilarResponse {
        id,
        total: results.len(),
        results,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    index_count: usize,
    updated_at: String,
    ollama_ok: bool,
}

async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let service = state.service.clone();
    let status = tokio::task::block_in_place(move || service.status());

    Json(StatusResponse {
        index_count: status.index_count,
        updated_at: status
            .updated_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
        ollama_ok: status.embedder_ok,
    })
}

async fn reindex(State(state): State<SharedState>) -> impl IntoResponse {
    log::info!("re-index triggered");
    spawn_index_run(state.indexer.clone());
    Json(json!({"status": "reindex started"}))
}
