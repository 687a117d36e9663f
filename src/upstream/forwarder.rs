//! Request forwarding to the fixed upstream.

use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::http::DATA_PARAM;

/// Errors raised while forwarding a request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream address {0:?}: {1}")]
    InvalidAddress(String, String),

    #[error("failed to build upstream request: {0}")]
    BuildRequest(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Thin adapter over the HTTP client that rebuilds inbound requests against
/// the single fixed upstream base address.
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
    comm_path: String,
}

impl Forwarder {
    /// Create a forwarder for the configured upstream.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let url = Url::parse(&upstream.address)
            .map_err(|e| ForwardError::InvalidAddress(upstream.address.clone(), e.to_string()))?;

        let host = url.host_str().ok_or_else(|| {
            ForwardError::InvalidAddress(upstream.address.clone(), "missing host".to_string())
        })?;
        let port = url.port_or_known_default().unwrap_or(80);
        let authority = Authority::from_str(&format!("{host}:{port}")).map_err(|e| {
            ForwardError::InvalidAddress(upstream.address.clone(), e.to_string())
        })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            scheme: Scheme::HTTP,
            authority,
            comm_path: upstream.comm_path.clone(),
        })
    }

    /// Forward a request to the upstream.
    ///
    /// With `override_data` the outbound path becomes the comm path carrying
    /// a freshly encoded `DATA` pair (the upstream observes the identical
    /// value); otherwise the original path and query pass through unchanged.
    pub async fn forward(
        &self,
        request: Request<Body>,
        override_data: Option<&str>,
    ) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let path_and_query = match override_data {
            Some(data) => self.comm_path_with_data(data),
            None => parts
                .uri
                .path_and_query()
                .map(|pq| pq.to_string())
                .unwrap_or_else(|| "/".to_string()),
        };

        let uri = self.upstream_uri(&path_and_query)?;

        let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in parts.headers.iter() {
                headers.insert(name.clone(), value.clone());
            }
        }
        let outbound = builder
            .body(body)
            .map_err(|e| ForwardError::BuildRequest(e.to_string()))?;

        let response: Response<hyper::body::Incoming> = self.client.request(outbound).await?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }

    fn comm_path_with_data(&self, data: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair(DATA_PARAM, data)
            .finish();
        format!("{}?{}", self.comm_path, query)
    }

    fn upstream_uri(&self, path_and_query: &str) -> Result<Uri, ForwardError> {
        let mut parts = axum::http::uri::Parts::default();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        parts.path_and_query = Some(
            PathAndQuery::from_str(path_and_query)
                .map_err(|e| ForwardError::BuildRequest(e.to_string()))?,
        );
        Uri::from_parts(parts).map_err(|e| ForwardError::BuildRequest(e.to_string()))
    }
}
