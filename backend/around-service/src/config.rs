use std::env;

use crate::error::AppError;
use crate::models::Radius;

const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";
const DEFAULT_INDEX: &str = "around";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub elasticsearch_url: String,
    pub index: String,
    pub port: u16,
    pub default_radius: Radius,
    /// Malformed or missing lat/lon become 0.0 instead of a 400.
    pub lenient_coordinates: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elasticsearch_url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            port: DEFAULT_PORT,
            default_radius: Radius::default(),
            lenient_coordinates: false,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_URL`: cluster endpoint (default: http://localhost:9200)
    /// - `AROUND_INDEX`: index holding the posts (default: around)
    /// - `PORT`: HTTP listen port (default: 8080)
    /// - `DEFAULT_RANGE_KM`: radius used when a search has no `range` (default: 200)
    /// - `LENIENT_COORDINATES`: `true` to zero-default bad lat/lon (default: false)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let elasticsearch_url = lookup("ELASTICSEARCH_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.elasticsearch_url);

        let index = lookup("AROUND_INDEX")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.index);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a valid u16, got {raw:?}")))?,
            None => defaults.port,
        };

        let default_radius = match lookup("DEFAULT_RANGE_KM") {
            Some(raw) => Radius::parse(&raw).ok_or_else(|| {
                AppError::Config(format!(
                    "DEFAULT_RANGE_KM must be a positive number, got {raw:?}"
                ))
            })?,
            None => defaults.default_radius,
        };

        let lenient_coordinates = match lookup("LENIENT_COORDINATES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("LENIENT_COORDINATES must be a boolean, got {raw:?}"))
            })?,
            None => defaults.lenient_coordinates,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "LOG_FORMAT must be text or json, got {other:?}"
                )))
            }
        };

        Ok(Self {
            elasticsearch_url,
            index,
            port,
            default_radius,
            lenient_coordinates,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
