use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Weather lookup result for a visitor or an explicit city
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct WeatherPage {
    /// Client IP the city was resolved from, absent for explicit city lookups
    pub ip: Option<String>,
    pub city: String,
    /// False when geolocation failed and the default city was used
    pub location_detected: bool,
    /// Short condition and temperature, e.g. `Sunny +20°C`
    pub weather: String,
    pub cached: bool,
    pub ttl_remaining_secs: u64,
}

/// Service health payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
