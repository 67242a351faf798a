use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use tracing::{debug, info};
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::error::{AppError, ErrorResponse};
use crate::models::{GeoQuery, Location, Post, Radius};
use crate::openapi::ApiDoc;
use crate::services::{PostFilter, PostIndex};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<dyn PostIndex>,
    pub filter: Arc<dyn PostFilter>,
    pub default_radius: Radius,
    pub lenient_coordinates: bool,
}

/// Raw query string of `GET /search`. Values stay strings so that parse
/// failures can be reported (or zero-defaulted) by the handler.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Latitude of the search center.
    pub lat: Option<String>,
    /// Longitude of the search center.
    pub lon: Option<String>,
    /// Radius in kilometres, 200 when absent.
    pub range: Option<String>,
}

impl SearchParams {
    /// Decode a form-urlencoded query string. The first occurrence of a
    /// repeated key wins, unknown keys are ignored.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(raw) = raw else {
            return params;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "lat" => &mut params.lat,
                "lon" => &mut params.lon,
                "range" => &mut params.range,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "OK"
}

#[utoipa::path(
    post,
    path = "/post",
    tag = "Posts",
    request_body = Post,
    responses(
        (status = 200, description = "Post stored and searchable"),
        (status = 400, description = "Body is not a post", body = ErrorResponse),
        (status = 502, description = "Elasticsearch rejected the write", body = ErrorResponse)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    info!("Received one post request");

    // Decoded regardless of Content-Type.
    let post: Post =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let id = Uuid::new_v4().to_string();
    state.index.index_post(&id, &post).await?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Posts",
    params(SearchParams),
    responses(
        (status = 200, description = "Posts within range, engine order", body = Vec<Post>),
        (status = 400, description = "Malformed coordinates or range", body = ErrorResponse),
        (status = 502, description = "Elasticsearch search failed", body = ErrorResponse)
    )
)]
pub async fn search_posts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    info!("Received one request for search");

    let params = SearchParams::from_query(raw.as_deref());
    let query = resolve_query(&params, state.default_radius, state.lenient_coordinates)?;
    info!(
        lat = query.center.lat,
        lon = query.center.lon,
        range = %query.radius.to_distance_string(),
        "Search received"
    );

    let posts: Vec<Post> = state
        .index
        .search_nearby(&query)
        .await?
        .into_iter()
        .filter(|post| state.filter.allow(post))
        .collect();

    for post in &posts {
        debug!(
            user = %post.user,
            message = %post.message,
            lat = post.location.lat,
            lon = post.location.lon,
            "Post found"
        );
    }

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(posts),
    ))
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Turn raw search parameters into a query.
///
/// In lenient mode a missing or malformed coordinate becomes `0.0`. A
/// malformed `range` is always rejected; an empty one means the default.
pub fn resolve_query(
    params: &SearchParams,
    default_radius: Radius,
    lenient: bool,
) -> Result<GeoQuery, AppError> {
    let lat = parse_coordinate("lat", params.lat.as_deref(), lenient)?;
    let lon = parse_coordinate("lon", params.lon.as_deref(), lenient)?;

    let radius = match params.range.as_deref().map(str::trim) {
        None | Some("") => default_radius,
        Some(raw) => Radius::parse(raw).ok_or_else(|| {
            AppError::InvalidQuery(format!("range must be a positive number, got {raw:?}"))
        })?,
    };

    Ok(GeoQuery {
        center: Location::new(lat, lon),
        radius,
    })
}

fn parse_coordinate(name: &str, raw: Option<&str>, lenient: bool) -> Result<f64, AppError> {
    let parsed = raw
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite());

    match (parsed, lenient) {
        (Some(value), _) => Ok(value),
        (None, true) => Ok(0.0),
        (None, false) => Err(match raw {
            None => AppError::InvalidQuery(format!("{name} is required")),
            Some(raw) => AppError::InvalidQuery(format!("{name} must be a number, got {raw:?}")),
        }),
    }
}
