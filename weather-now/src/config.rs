use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CITY: &str = "Moscow";
pub const CITY_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const WEATHER_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub geo_api_url: String,
    pub weather_api_url: String,
    pub default_city: String,
    pub city_cache_ttl: Duration,
    pub weather_cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub upstream_max_retries: u32,
    /// `None` disables the background sweep
    pub sweep_interval: Option<Duration>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for
    /// missing or unparseable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| parse::<u64>(&v));

        Self {
            port: lookup("PORT")
                .and_then(|p| parse(&p))
                .unwrap_or(8080),
            geo_api_url: lookup("GEO_API_URL")
                .unwrap_or_else(|| "http://ip-api.com/json".to_string()),
            weather_api_url: lookup("WEATHER_API_URL")
                .unwrap_or_else(|| "https://wttr.in".to_string()),
            default_city: lookup("DEFAULT_CITY")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            city_cache_ttl: parsed("CITY_CACHE_TTL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(CITY_CACHE_TTL),
            weather_cache_ttl: parsed("WEATHER_CACHE_TTL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(WEATHER_CACHE_TTL),
            upstream_timeout: parsed("UPSTREAM_TIMEOUT_SECONDS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(5)),
            upstream_max_retries: lookup("UPSTREAM_MAX_RETRIES")
                .and_then(|r| parse(&r))
                .unwrap_or(0),
            sweep_interval: match parsed("CACHE_SWEEP_INTERVAL_SECONDS").unwrap_or(300) {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        }
    }
}

fn parse<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}
