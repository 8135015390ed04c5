use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{HealthResponse, WeatherPage};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::index,
        handlers::visitor_weather,
        handlers::city_weather,
    ),
    components(schemas(WeatherPage, HealthResponse)),
    tags(
        (name = "weather", description = "Visitor location and weather lookups"),
    ),
)]
struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
