use crate::cache::ExpiringCache;
use common::errors::AppError;
use common::http_client::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    city: String,
}

/// Outcome of a city lookup. Never an error: failed lookups carry the
/// default city with `detected = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityResolution {
    pub city: String,
    pub detected: bool,
}

/// Resolves client IPs to city names through the geolocation upstream,
/// remembering successful answers per IP.
pub struct LocationResolver {
    http_client: Arc<HttpClient>,
    cache: Arc<ExpiringCache>,
    base_url: String,
    default_city: String,
    ttl: Duration,
}

impl LocationResolver {
    pub fn new(
        http_client: Arc<HttpClient>,
        cache: Arc<ExpiringCache>,
        base_url: String,
        default_city: String,
        ttl: Duration,
    ) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_city,
            ttl,
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    #[instrument(skip(self), fields(ip = %ip))]
    pub async fn resolve_city(&self, ip: &str) -> CityResolution {
        if let Some(hit) = self.cache.get(ip).await {
            info!(city = %hit.value, "City cache hit");
            return CityResolution {
                city: hit.value,
                detected: true,
            };
        }

        match self.lookup(ip).await {
            Ok(city) => {
                self.cache.set(ip, city.as_str(), self.ttl).await;
                info!(city = %city, "City resolved from upstream");
                CityResolution {
                    city,
                    detected: true,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    default_city = %self.default_city,
                    "Geolocation failed, using default city"
                );
                CityResolution {
                    city: self.default_city.clone(),
                    detected: false,
                }
            }
        }
    }

    async fn lookup(&self, ip: &str) -> Result<String, AppError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(ip));
        let response: IpApiResponse = self.http_client.get_json(&url).await?;

        let city = response.city.trim();
        if city.is_empty() {
            return Err(AppError::empty_response(format!("no city for {}", ip)));
        }
        Ok(city.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn resolver(base_url: String, cache: Arc<ExpiringCache>) -> LocationResolver {
        let http_client =
            Arc::new(HttpClient::new(Duration::from_secs(2), 0).expect("client builds"));
        LocationResolver::new(
            http_client,
            cache,
            base_url,
            "Moscow".to_string(),
            Duration::from_secs(24 * 60 * 60),
        )
    }

    #[tokio::test]
    async fn empty_city_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/10.0.0.1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status":"fail","message":"private range","city":""}"#),
            )
            .mount(&server)
            .await;

        let cache = Arc::new(ExpiringCache::new());
        let resolution = resolver(server.uri(), cache.clone())
            .resolve_city("10.0.0.1")
            .await;

        assert_eq!(resolution.city, "Moscow");
        assert!(!resolution.detected);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn missing_city_field_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"fail"}"#))
            .mount(&server)
            .await;

        let resolution = resolver(server.uri(), Arc::new(ExpiringCache::new()))
            .resolve_city("127.0.0.1")
            .await;
        assert_eq!(
            resolution,
            CityResolution {
                city: "Moscow".to_string(),
                detected: false
            }
        );
    }

    #[tokio::test]
    async fn unparseable_body_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let resolution = resolver(server.uri(), Arc::new(ExpiringCache::new()))
            .resolve_city("1.2.3.4")
            .await;
        assert!(!resolution.detected);
        assert_eq!(resolution.city, "Moscow");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let resolver = resolver(server.uri(), Arc::new(ExpiringCache::new()));
        assert!(!resolver.resolve_city("1.2.3.4").await.detected);
        assert!(!resolver.resolve_city("1.2.3.4").await.detected);
    }

    #[tokio::test]
    async fn cached_city_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"city":"Berlin"}"#))
            .expect(0)
            .mount(&server)
            .await;

        let cache = Arc::new(ExpiringCache::new());
        cache
            .set("5.6.7.8", "Lisbon", Duration::from_secs(60))
            .await;

        let resolution = resolver(server.uri(), cache).resolve_city("5.6.7.8").await;
        assert_eq!(resolution.city, "Lisbon");
        assert!(resolution.detected);
    }
}
