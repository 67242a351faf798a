pub mod elasticsearch;

use async_trait::async_trait;

use crate::models::{GeoQuery, Post};

pub use self::elasticsearch::{ElasticsearchClient, ElasticsearchError};

/// Storage and geo-query operations the HTTP layer depends on.
///
/// `ElasticsearchClient` is the production implementation. The handle is built
/// once at startup and shared by every request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostIndex: Send + Sync {
    /// Create the index with its `geo_point` mapping if it does not exist yet.
    async fn ensure_index(&self) -> Result<(), ElasticsearchError>;

    /// Store `post` under `id`, replacing any document with the same id.
    /// The write is visible to searches as soon as this returns.
    async fn index_post(&self, id: &str, post: &Post) -> Result<(), ElasticsearchError>;

    /// Posts whose location lies within `query.radius` of `query.center`,
    /// in the order the engine returned them.
    async fn search_nearby(&self, query: &GeoQuery) -> Result<Vec<Post>, ElasticsearchError>;

    async fn health_check(&self) -> Result<bool, ElasticsearchError>;
}

/// Hook applied to search results before they are returned.
///
/// Keyword or spam filtering would plug in here. The service ships
/// `AllowAll` only.
pub trait PostFilter: Send + Sync {
    fn allow(&self, post: &Post) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PostFilter for AllowAll {
    fn allow(&self, _post: &Post) -> bool {
        true
    }
}
