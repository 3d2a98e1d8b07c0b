//! Pinecone data-plane client.
//!
//! One `POST {host}/query` per call, no retries. When no host is configured
//! it is looked up once from the control plane by index name, the same way
//! the Python SDK's `Index(name)` does.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

use paperrag_core::config::IndexSettings;
use paperrag_core::error::{Error, Result};
use paperrag_core::traits::EmbeddingIndex;
use paperrag_core::types::{IndexMatch, QueryVector, VectorSpace};

const API_VERSION: &str = "2025-01";

pub struct PineconeIndex<S> {
    client: Client,
    name: String,
    host: String,
    api_key: String,
    namespace: Option<String>,
    dimension: Option<usize>,
    _space: PhantomData<S>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<IndexMatch>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
    #[serde(default)]
    dimension: Option<usize>,
}

impl<S: VectorSpace> PineconeIndex<S> {
    pub async fn connect(settings: &IndexSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::InvalidConfig(format!("api_key missing for index '{}'", settings.name)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(Error::backend)?;

        let (host, dimension) = match &settings.host {
            Some(host) => (host.clone(), None),
            None => {
                let url = format!("{}/indexes/{}", settings.control_plane_url.trim_end_matches('/'), settings.name);
                let described: DescribeIndexResponse = decode(send(authorize(client.get(&url), &api_key)).await?).await?;
                (described.host, described.dimension)
            }
        };
        let host = normalize_host(&host);
        info!(index = %settings.name, %host, modality = %S::MODALITY, "connected to pinecone index");

        Ok(Self {
            client,
            name: settings.name.clone(),
            host,
            api_key,
            namespace: settings.namespace.clone(),
            dimension,
            _space: PhantomData,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl<S: VectorSpace> EmbeddingIndex<S> for PineconeIndex<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, vector: &QueryVector<S>, top_k: usize) -> Result<Vec<IndexMatch>> {
        if top_k == 0 {
            return Err(Error::InvalidQuery("top_k must be a positive integer".to_string()));
        }
        if let Some(expected) = self.dimension {
            if vector.dim() != expected {
                return Err(Error::backend(format!(
                    "index '{}' expects {} dims, query has {}",
                    self.name,
                    expected,
                    vector.dim()
                )));
            }
        }
        debug!(index = %self.name, top_k, "querying pinecone");
        let body = QueryRequest {
            vector: vector.values(),
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };
        let request = authorize(self.client.post(format!("{}/query", self.host)), &self.api_key).json(&body);
        let response: QueryResponse = decode(send(request).await?).await?;
        debug!(index = %self.name, hits = response.matches.len(), "pinecone query done");
        Ok(response.matches)
    }
}

fn authorize(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request.header("Api-Key", api_key).header("X-Pinecone-API-Version", API_VERSION)
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            Error::backend(format!("pinecone request timed out: {}", e))
        } else {
            Error::backend(format!("pinecone request failed: {}", e))
        }
    })?;
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(Error::backend(format!("pinecone API error {}: {}", status, error_text)));
    }
    Ok(response)
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response.json().await.map_err(|e| Error::backend(format!("invalid pinecone response: {}", e)))
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
