//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with the comm route and the catch-all passthrough
//! - Wire up middleware (request ID, tracing, timeout)
//! - Decode the `DATA` parameter and consult the admission filter
//! - Short-circuit suppressed duplicates; delegate everything else upstream
//! - Graceful shutdown via the broadcast channel

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::form_urlencoded;

use crate::config::ProxyConfig;
use crate::dedup::{record, AdmissionFilter, Decision};
use crate::http::request::MakeRequestUuid;
use crate::http::{DATA_PARAM, X_REQUEST_ID};
use crate::observability::metrics;
use crate::upstream::Forwarder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub filter: Arc<AdmissionFilter>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the telemetry proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and services.
    pub fn new(config: &ProxyConfig, filter: Arc<AdmissionFilter>, forwarder: Arc<Forwarder>) -> Self {
        let state = AppState { filter, forwarder };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.upstream.comm_path, any(comm_handler))
            .route("/{*path}", any(passthrough_handler))
            .route("/", any(passthrough_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(
                        header::HeaderName::from_static(X_REQUEST_ID),
                        MakeRequestUuid,
                    ))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(
                        X_REQUEST_ID,
                    ))),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handler for the comm route.
///
/// GET with a decodable `DATA` parameter goes through the admission filter;
/// undecodable payloads and non-GET methods are forwarded unconditionally.
async fn comm_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();

    if request.method() != Method::GET {
        return forward(&state, request, None, "comm", start).await;
    }

    let data = query_param(request.uri(), DATA_PARAM);
    let Some(data) = data.filter(|value| !value.is_empty()) else {
        metrics::record_request("GET", StatusCode::BAD_REQUEST.as_u16(), "comm", start);
        return (StatusCode::BAD_REQUEST, "DATA parameter is required.").into_response();
    };

    match record::decode(&data) {
        Err(error) => {
            // Don't care that it's bad, the upstream gets it as-is.
            tracing::debug!(%error, "forwarding undecodable DATA parameter");
            forward(&state, request, Some(data.as_str()), "comm", start).await
        }
        Ok(record) => match state.filter.classify(&record) {
            Decision::Drop => {
                tracing::debug!(record_type = %record.record_type, "duplicate record suppressed");
                metrics::record_decision(&record.record_type, true);
                metrics::record_request("GET", StatusCode::OK.as_u16(), "comm", start);
                drop_acknowledgment()
            }
            Decision::Forward => {
                metrics::record_decision(&record.record_type, false);
                forward(&state, request, Some(data.as_str()), "comm", start).await
            }
        },
    }
}

/// Handler for everything else in the route space: forward unconditionally.
async fn passthrough_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    forward(&state, request, None, "passthrough", start).await
}

/// Delegate to the forwarder, mapping transport failures to a 502.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    override_data: Option<&str>,
    route: &'static str,
    start: Instant,
) -> Response {
    let method = request.method().to_string();

    match state.forwarder.forward(request, override_data).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), route, start);
            response.into_response()
        }
        Err(error) => {
            tracing::error!(%error, route, "upstream forward failed");
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), route, start);
            (
                StatusCode::BAD_GATEWAY,
                format!("upstream request failed: {error}"),
            )
                .into_response()
        }
    }
}

/// Success acknowledgment for a suppressed duplicate: empty body, plain text.
fn drop_acknowledgment() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "",
    )
        .into_response()
}

/// Extract a query parameter from a request URI.
fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
