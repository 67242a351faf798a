use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Distance unit appended to every radius sent to Elasticsearch.
pub const DISTANCE_UNIT: &str = "km";

/// Radius applied when a search carries no `range`.
pub const DEFAULT_RANGE_KM: f64 = 200.0;

/// Latitude/longitude pair. Stored as a `geo_point`, no range validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A short message tagged with the coordinate it was posted from.
///
/// Also the `_source` shape of every document in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
}

/// Search radius in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius {
    km: f64,
}

impl Radius {
    /// Returns `None` for non-finite or non-positive values.
    pub fn from_km(km: f64) -> Option<Self> {
        if km.is_finite() && km > 0.0 {
            Some(Self { km })
        } else {
            None
        }
    }

    /// Parse the bare number carried by the `range` query parameter.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().and_then(Self::from_km)
    }

    pub fn km(&self) -> f64 {
        self.km
    }

    /// Distance string in Elasticsearch notation, e.g. `200km`.
    pub fn to_distance_string(&self) -> String {
        format!("{}{}", self.km, DISTANCE_UNIT)
    }
}

impl Default for Radius {
    fn default() -> Self {
        Self {
            km: DEFAULT_RANGE_KM,
        }
    }
}

/// Everything needed to run one geo-distance search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQuery {
    pub center: Location,
    pub radius: Radius,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_uses_wire_field_names() {
        let post: Post = serde_json::from_str(
            r#"{"user":"1111","message":"hello","location":{"lat":40.0,"lon":-70.0}}"#,
        )
        .unwrap();

        assert_eq!(post.user, "1111");
        assert_eq!(post.location, Location::new(40.0, -70.0));

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["location"]["lon"], -70.0);
    }

    #[test]
    fn post_rejects_missing_location() {
        let result = serde_json::from_str::<Post>(r#"{"user":"a","message":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn radius_default_is_200km() {
        assert_eq!(Radius::default().to_distance_string(), "200km");
    }

    #[test]
    fn radius_parse() {
        assert_eq!(Radius::parse("500").unwrap().to_distance_string(), "500km");
        assert_eq!(Radius::parse(" 12.5 ").unwrap().km(), 12.5);
        assert!(Radius::parse("").is_none());
        assert!(Radius::parse("abc").is_none());
        assert!(Radius::parse("0").is_none());
        assert!(Radius::parse("-3").is_none());
        assert!(Radius::parse("NaN").is_none());
        assert!(Radius::parse("inf").is_none());
    }
}
