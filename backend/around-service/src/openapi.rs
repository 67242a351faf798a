//! OpenAPI documentation for the Around service
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::{Location, Post};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Around Service API",
        version = "1.0.0",
        description = "Share short posts tagged with a location and find posts nearby",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        crate::handlers::health_handler,
        crate::handlers::create_post,
        crate::handlers::search_posts,
    ),
    components(schemas(Post, Location, ErrorResponse)),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Posts", description = "Post ingestion and geo search"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/openapi.json"
    }
}
