//! # Around Service
//!
//! HTTP bridge between clients sharing location-tagged posts and an
//! Elasticsearch index that stores them and answers geo-distance queries.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::AppError;
pub use handlers::AppState;
pub use models::{GeoQuery, Location, Post, Radius};
pub use services::{AllowAll, ElasticsearchClient, ElasticsearchError, PostFilter, PostIndex};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            openapi::ApiDoc::openapi_json_path(),
            get(handlers::openapi_json),
        )
        .route("/post", post(handlers::create_post))
        .route("/search", get(handlers::search_posts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
