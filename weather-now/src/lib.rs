pub mod cache;
pub mod config;
pub mod handlers;
pub mod location;
pub mod openapi;
pub mod page;
pub mod sweeper;
pub mod weather;

use axum::{Router, routing::get};
use common::errors::AppError;
use common::http_client::HttpClient;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::handlers::AppState;
use crate::location::LocationResolver;
use crate::weather::WeatherResolver;

/// Caches shared between the resolvers and the background sweeper
pub struct Caches {
    pub city: Arc<ExpiringCache>,
    pub weather: Arc<ExpiringCache>,
}

impl Caches {
    pub fn new() -> Self {
        Self {
            city: Arc::new(ExpiringCache::new()),
            weather: Arc::new(ExpiringCache::new()),
        }
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire both resolvers onto one shared HTTP client
pub fn build_state(config: &Config, caches: &Caches) -> Result<AppState, AppError> {
    let http_client = Arc::new(HttpClient::new(
        config.upstream_timeout,
        config.upstream_max_retries,
    )?);

    let location = Arc::new(LocationResolver::new(
        http_client.clone(),
        caches.city.clone(),
        config.geo_api_url.clone(),
        config.default_city.clone(),
        config.city_cache_ttl,
    ));
    let weather = Arc::new(WeatherResolver::new(
        http_client,
        caches.weather.clone(),
        config.weather_api_url.clone(),
        config.weather_cache_ttl,
    ));

    Ok(AppState { location, weather })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/weather", get(handlers::visitor_weather))
        .route("/api/weather/{city}", get(handlers::city_weather))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
