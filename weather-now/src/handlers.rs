use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::HeaderMap,
    response::{Html, Json},
};
use common::errors::AppError;
use common::models::{HealthResponse, WeatherPage};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::location::{CityResolution, LocationResolver};
use crate::page::{self, PageView};
use crate::weather::{WeatherReport, WeatherResolver};

#[derive(Clone)]
pub struct AppState {
    pub location: Arc<LocationResolver>,
    pub weather: Arc<WeatherResolver>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "weather-now".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "HTML page with the visitor's local weather", body = String, content_type = "text/html"),
        (status = 500, description = "Weather upstream unavailable")
    ),
    tag = "weather"
)]
pub async fn index(
    State(state): State<AppState>,
    request: Request,
) -> Result<Html<String>, AppError> {
    let ip = client_ip(&request);
    let (city, report) = resolve_for_ip(&state, &ip).await?;

    let html = page::render(&PageView {
        ip: &ip,
        city: &city.city,
        detected: city.detected,
        default_city: state.location.default_city(),
        weather: &report.text,
        cached: report.cache_hit,
        ttl_remaining: report.ttl_remaining,
    });

    Ok(Html(html))
}

#[utoipa::path(
    get,
    path = "/api/weather",
    responses(
        (status = 200, description = "Weather for the visitor's resolved city", body = WeatherPage),
        (status = 500, description = "Weather upstream unavailable")
    ),
    tag = "weather"
)]
pub async fn visitor_weather(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<WeatherPage>, AppError> {
    let ip = client_ip(&request);
    let (city, report) = resolve_for_ip(&state, &ip).await?;

    Ok(Json(to_page(Some(ip), city, report)))
}

#[utoipa::path(
    get,
    path = "/api/weather/{city}",
    params(
        ("city" = String, Path, description = "City name")
    ),
    responses(
        (status = 200, description = "Weather for the city", body = WeatherPage),
        (status = 500, description = "Weather upstream unavailable")
    ),
    tag = "weather"
)]
pub async fn city_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherPage>, AppError> {
    info!(city = %city, "Weather request received");

    let report = state.weather.resolve_weather(&city).await?;
    let city = CityResolution {
        city,
        detected: true,
    };

    Ok(Json(to_page(None, city, report)))
}

async fn resolve_for_ip(
    state: &AppState,
    ip: &str,
) -> Result<(CityResolution, WeatherReport), AppError> {
    info!(ip = %ip, "Visitor weather request received");

    let city = state.location.resolve_city(ip).await;
    let report = state.weather.resolve_weather(&city.city).await?;
    Ok((city, report))
}

fn to_page(ip: Option<String>, city: CityResolution, report: WeatherReport) -> WeatherPage {
    WeatherPage {
        ip,
        city: city.city,
        location_detected: city.detected,
        weather: report.text,
        cached: report.cache_hit,
        ttl_remaining_secs: report.ttl_remaining.as_secs(),
    }
}

/// Client IP from proxy headers, falling back to the peer address
pub fn client_ip(request: &Request) -> String {
    if let Some(ip) = forwarded_ip(request.headers()) {
        return ip;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = header_value(headers, "CF-Connecting-IP") {
        return Some(ip.to_string());
    }

    header_value(headers, "X-Forwarded-For")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
