#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use around_service::{
    build_router, AllowAll, AppState, ElasticsearchError, GeoQuery, Location, Post, PostIndex,
    Radius,
};
use tower::ServiceExt;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great circle distance in metres.
pub fn haversine_distance(a: &Location, b: &Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Index kept in memory, answering geo queries with haversine distance.
#[derive(Default)]
pub struct InMemoryPostIndex {
    docs: Mutex<Vec<(String, Post)>>,
    fail_writes: bool,
}

impl InMemoryPostIndex {
    pub fn failing() -> Self {
        Self {
            docs: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl PostIndex for InMemoryPostIndex {
    async fn ensure_index(&self) -> Result<(), ElasticsearchError> {
        Ok(())
    }

    async fn index_post(&self, id: &str, post: &Post) -> Result<(), ElasticsearchError> {
        if self.fail_writes {
            return Err(ElasticsearchError::Write {
                status: 503,
                body: "cluster unavailable".to_string(),
            });
        }

        let mut docs = self.docs.lock().unwrap();
        docs.retain(|(existing, _)| existing != id);
        docs.push((id.to_string(), post.clone()));
        Ok(())
    }

    async fn search_nearby(&self, query: &GeoQuery) -> Result<Vec<Post>, ElasticsearchError> {
        let limit_m = query.radius.km() * 1000.0;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, post)| haversine_distance(&query.center, &post.location) <= limit_m)
            .map(|(_, post)| post.clone())
            .collect())
    }

    async fn health_check(&self) -> Result<bool, ElasticsearchError> {
        Ok(true)
    }
}

pub fn app(index: Arc<InMemoryPostIndex>, lenient: bool) -> Router {
    build_router(AppState {
        index,
        filter: Arc::new(AllowAll),
        default_radius: Radius::default(),
        lenient_coordinates: lenient,
    })
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/post")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub fn search_request(query: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/search?{query}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn post_at(user: &str, message: &str, lat: f64, lon: f64) -> Post {
    Post {
        user: user.to_string(),
        message: message.to_string(),
        location: Location::new(lat, lon),
    }
}
