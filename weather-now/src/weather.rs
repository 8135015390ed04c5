use crate::cache::ExpiringCache;
use common::errors::AppError;
use common::http_client::HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Condition and temperature, e.g. `Sunny +20°C`
const WTTR_QUERY: &str = "format=%C+%t&lang=en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub text: String,
    pub cache_hit: bool,
    pub ttl_remaining: Duration,
}

/// Fetches short weather text per city through the weather upstream, with a
/// short-lived cache in front of it.
pub struct WeatherResolver {
    http_client: Arc<HttpClient>,
    cache: Arc<ExpiringCache>,
    base_url: String,
    ttl: Duration,
}

impl WeatherResolver {
    pub fn new(
        http_client: Arc<HttpClient>,
        cache: Arc<ExpiringCache>,
        base_url: String,
        ttl: Duration,
    ) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    /// Returns the cached or freshly fetched weather for `city`.
    ///
    /// Every upstream failure collapses into [`AppError::WeatherUnavailable`];
    /// there is no fallback text and nothing is cached on failure.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn resolve_weather(&self, city: &str) -> Result<WeatherReport, AppError> {
        if let Some(hit) = self.cache.get(city).await {
            info!(ttl_remaining_secs = hit.ttl_remaining.as_secs(), "Weather cache hit");
            return Ok(WeatherReport {
                text: hit.value,
                cache_hit: true,
                ttl_remaining: hit.ttl_remaining,
            });
        }

        let text = match self.fetch(city).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Weather upstream unavailable");
                return Err(AppError::weather_unavailable(city));
            }
        };

        self.cache.set(city, text.as_str(), self.ttl).await;
        info!(weather = %text, "Weather fetched from upstream");

        Ok(WeatherReport {
            text,
            cache_hit: false,
            ttl_remaining: self.ttl,
        })
    }

    async fn fetch(&self, city: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/{}?{}",
            self.base_url,
            urlencoding::encode(city),
            WTTR_QUERY
        );
        let body = self.http_client.get_text(&url).await?;

        let text = body.trim();
        if text.is_empty() {
            return Err(AppError::empty_response(format!("no weather for {}", city)));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn resolver(base_url: String, cache: Arc<ExpiringCache>) -> WeatherResolver {
        let http_client =
            Arc::new(HttpClient::new(Duration::from_secs(2), 0).expect("client builds"));
        WeatherResolver::new(http_client, cache, base_url, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn city_name_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/New%20York"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Clear +5°C\n"))
            .expect(1)
            .mount(&server)
            .await;

        let report = resolver(server.uri(), Arc::new(ExpiringCache::new()))
            .resolve_weather("New York")
            .await
            .expect("weather available");
        assert_eq!(report.text, "Clear +5°C");
        assert!(!report.cache_hit);
    }

    #[tokio::test]
    async fn error_status_is_unavailable_and_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown location"))
            .expect(2)
            .mount(&server)
            .await;

        let cache = Arc::new(ExpiringCache::new());
        let resolver = resolver(server.uri(), cache.clone());
        for _ in 0..2 {
            let err = resolver
                .resolve_weather("Atlantis")
                .await
                .expect_err("404 is unavailable");
            assert!(matches!(err, AppError::WeatherUnavailable(ref city) if city == "Atlantis"));
        }
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn blank_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let result = resolver(server.uri(), Arc::new(ExpiringCache::new()))
            .resolve_weather("Paris")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn caches_per_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Sunny +20°C"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Oslo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Snow -3°C"))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver(server.uri(), Arc::new(ExpiringCache::new()));
        for _ in 0..3 {
            assert_eq!(
                resolver.resolve_weather("Paris").await.expect("paris").text,
                "Sunny +20°C"
            );
            assert_eq!(
                resolver.resolve_weather("Oslo").await.expect("oslo").text,
                "Snow -3°C"
            );
        }
    }
}
