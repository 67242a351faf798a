use async_trait::async_trait;
use elasticsearch::{
    http::{
        response::Response,
        transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    Elasticsearch, IndexParts, SearchParts,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{GeoQuery, Post};
use crate::services::PostIndex;

/// Name of the `geo_point` field every document carries.
pub const LOCATION_FIELD: &str = "location";

#[derive(Debug, Error)]
pub enum ElasticsearchError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("index creation failed with status {status}: {body}")]
    IndexCreation { status: u16, body: String },
    #[error("document write failed with status {status}: {body}")]
    Write { status: u16, body: String },
    #[error("search failed with status {status}: {body}")]
    Search { status: u16, body: String },
}

#[derive(Clone)]
pub struct ElasticsearchClient {
    client: Elasticsearch,
    index: String,
}

impl ElasticsearchClient {
    /// Build a client for a single-node cluster. No request is sent here.
    pub fn new(url: &str, index: &str) -> Result<Self, ElasticsearchError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).disable_proxy().build()?;
        let client = Elasticsearch::new(transport);

        info!(url = %url, index = %index, "Created Elasticsearch client");

        Ok(Self {
            client,
            index: index.to_string(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    async fn create_index(&self) -> Result<(), ElasticsearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index))
            .body(index_mapping())
            .send()
            .await?;

        let status = response.status_code().as_u16();
        if response.status_code().is_success() {
            info!(index = %self.index, "Created index with geo_point mapping");
            return Ok(());
        }

        let body = error_body(response).await;
        // Another replica may have created it between our check and create.
        if body.contains("resource_already_exists_exception") {
            debug!(index = %self.index, "Index created concurrently");
            return Ok(());
        }

        Err(ElasticsearchError::IndexCreation { status, body })
    }
}

#[async_trait]
impl PostIndex for ElasticsearchClient {
    async fn ensure_index(&self) -> Result<(), ElasticsearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index.as_str()]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => {
                debug!(index = %self.index, "Index already exists");
                Ok(())
            }
            404 => self.create_index().await,
            status => Err(ElasticsearchError::IndexCreation {
                status,
                body: error_body(response).await,
            }),
        }
    }

    async fn index_post(&self, id: &str, post: &Post) -> Result<(), ElasticsearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, id))
            .body(post)
            .refresh(Refresh::True)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(ElasticsearchError::Write {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        info!(id = %id, message = %post.message, "Post is saved to index");
        Ok(())
    }

    async fn search_nearby(&self, query: &GeoQuery) -> Result<Vec<Post>, ElasticsearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index.as_str()]))
            .body(geo_distance_query(query))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(ElasticsearchError::Search {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let body: SearchResponse = response.json().await?;
        info!(
            took_ms = body.took,
            total = body.hits.total_hits(),
            "Geo search completed"
        );

        Ok(posts_from_hits(body.hits.hits))
    }

    async fn health_check(&self) -> Result<bool, ElasticsearchError> {
        let response = self.client.ping().send().await?;
        Ok(response.status_code().is_success())
    }
}

async fn error_body(response: Response) -> String {
    response.text().await.unwrap_or_default()
}

/// Settings and mappings used when the index is created.
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                LOCATION_FIELD: { "type": "geo_point" }
            }
        }
    })
}

/// Search body selecting documents within the radius of the query center.
pub fn geo_distance_query(query: &GeoQuery) -> Value {
    json!({
        "query": {
            "geo_distance": {
                "distance": query.radius.to_distance_string(),
                LOCATION_FIELD: {
                    "lat": query.center.lat,
                    "lon": query.center.lon
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    took: u64,
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

impl SearchHits {
    fn total_hits(&self) -> u64 {
        match self.total {
            Some(TotalHits::Object { value }) => value,
            Some(TotalHits::Count(value)) => value,
            None => self.hits.len() as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

/// Decode hit sources into posts, keeping engine order.
///
/// Hits without a source, or whose source is not a post, are skipped.
fn posts_from_hits(hits: Vec<SearchHit>) -> Vec<Post> {
    hits.into_iter()
        .filter_map(|hit| {
            let source = hit.source?;
            match serde_json::from_value::<Post>(source) {
                Ok(post) => Some(post),
                Err(err) => {
                    warn!(id = ?hit.id, error = %err, "Skipping hit that is not a post");
                    None
                }
            }
        })
        .collect()
}
