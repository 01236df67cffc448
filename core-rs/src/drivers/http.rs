//! HttpTransport for Fuseki-compatible triplestores
//!
//! Provides the real network transport including:
//! - one shared `reqwest::Client` with a per-request timeout
//! - basic authentication on every request when credentials are configured
//! - graph store protocol uploads and SPARQL query/update requests
//!
//! Each request owns its response; the connection goes back to the pool when
//! the body has been read or the response is dropped on an error path.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::time::Duration;

use super::traits::{HttpReply, TransportResult, TriplestoreTransport};
use crate::config::{Credentials, PublisherConfig};
use crate::dataset::StorageKind;
use crate::errors::{PublishError, Result};
use crate::ontology::{ContentType, GraphTarget, SparqlQuery, SparqlUpdate};

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const SPARQL_UPDATE: &str = "application/sparql-update";

/// Upper bound for TCP connect, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP transport for triplestore operations
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from publisher configuration
    ///
    /// # Example
    ///
    /// ```
    /// use ontopub_core::config::PublisherConfig;
    /// use ontopub_core::drivers::HttpTransport;
    ///
    /// let config = PublisherConfig::new("http://localhost:3030");
    /// let transport = HttpTransport::from_config(&config).unwrap();
    /// assert_eq!(transport.base_url(), "http://localhost:3030");
    /// ```
    pub fn from_config(config: &PublisherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PublishError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/$/{}", self.base_url, path)
    }

    fn dataset_url(&self, dataset: &str, service: &str) -> String {
        format!("{}/{}/{}", self.base_url, dataset, service)
    }

    /// Graph store protocol URL; the default graph uses the bare `?default` flag
    fn data_url(&self, dataset: &str, graph: &GraphTarget) -> String {
        let base = self.dataset_url(dataset, "data");
        match graph {
            GraphTarget::Default => format!("{}?default", base),
            GraphTarget::Named(_) => base,
        }
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> TransportResult {
        let response = self
            .authed(request)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl TriplestoreTransport for HttpTransport {
    async fn ping(&self) -> TransportResult {
        self.send(self.client.get(self.admin_url("ping"))).await
    }

    async fn create_dataset(&self, name: &str, storage: StorageKind) -> TransportResult {
        let form = [("dbName", name), ("dbType", storage.db_type())];
        self.send(self.client.post(self.admin_url("datasets")).form(&form))
            .await
    }

    async fn list_datasets(&self) -> TransportResult {
        self.send(
            self.client
                .get(self.admin_url("datasets"))
                .header(ACCEPT, "application/json"),
        )
        .await
    }

    async fn update(&self, dataset: &str, update: &SparqlUpdate) -> TransportResult {
        self.send(
            self.client
                .post(self.dataset_url(dataset, "update"))
                .header(CONTENT_TYPE, SPARQL_UPDATE)
                .body(update.as_str().to_string()),
        )
        .await
    }

    async fn upload(
        &self,
        dataset: &str,
        graph: &GraphTarget,
        content_type: ContentType,
        payload: Vec<u8>,
    ) -> TransportResult {
        let mut request = self
            .client
            .post(self.data_url(dataset, graph))
            .header(CONTENT_TYPE, content_type.mime())
            .body(payload);

        if let GraphTarget::Named(iri) = graph {
            request = request.query(&[("graph", iri.as_str())]);
        }

        self.send(request).await
    }

    async fn query(&self, dataset: &str, query: &SparqlQuery) -> TransportResult {
        self.send(
            self.client
                .get(self.dataset_url(dataset, "sparql"))
                .query(&[("query", query.as_str())])
                .header(ACCEPT, SPARQL_RESULTS_JSON),
        )
        .await
    }
}
