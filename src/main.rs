// IMD Weather API v0.1
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::fetcher::ImdClient;
use services::rate_limit::RateLimiter;
use services::stations::StationDirectory;

/// OpenAPI document for the IMD Weather API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "IMD Weather API",
        version = "0.1.0",
        description = "Station weather and national weather alerts scraped from the \
            India Meteorological Department portal. Pages are fetched on every request \
            and parsed best-effort: missing fields degrade the result instead of failing it.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Stations", description = "Static station directory"),
        (name = "Weather", description = "Current station weather and forecast"),
        (name = "Alerts", description = "National weather alerts"),
    ),
    paths(
        routes::health::health_check,
        routes::stations::list_stations,
        routes::stations::get_station,
        routes::weather::get_station_weather,
        routes::alerts::get_all_alerts,
        routes::alerts::get_state_alerts,
        routes::alerts::get_alerts_summary,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::stations::StationRecord,
            services::station::WeatherReading,
            services::station::ForecastDay,
            services::alerts::AlertRecord,
            services::alerts::AlertCollection,
            services::portal::StateAlerts,
            services::summary::AlertsSummary,
            services::summary::AlertLevelCounts,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imd_weather_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Load the station directory once; a failed load is reported per request.
    let stations = StationDirectory::load(Path::new(&config.stations_file));
    match &stations {
        Ok(directory) if directory.is_empty() => {
            tracing::warn!("Station file {} contains no stations", config.stations_file)
        }
        Ok(directory) => tracing::info!(
            "Loaded {} stations from {}",
            directory.len(),
            config.stations_file
        ),
        Err(e) => tracing::error!(
            "Failed to load stations from {}: {}",
            config.stations_file,
            e
        ),
    }

    let client = ImdClient::new(
        &config.station_url_template,
        &config.alerts_url,
        Duration::from_secs(config.request_timeout_secs),
    );
    tracing::info!("Alerts page: {}", client.alerts_url());

    let app_state = AppState {
        client,
        stations: Arc::new(stations),
    };

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_hourly,
        config.rate_limit_daily,
    ));
    tracing::info!(
        "Rate limits: {} per hour, {} per day",
        config.rate_limit_hourly,
        config.rate_limit_daily
    );

    // CORS: read-only API, GET only
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/station/all", get(routes::stations::list_stations))
        .route("/station/:id", get(routes::stations::get_station))
        .route("/weather/:id", get(routes::weather::get_station_weather))
        .route("/alerts", get(routes::alerts::get_all_alerts))
        .route("/alerts/summary", get(routes::alerts::get_alerts_summary))
        .route(
            "/alerts/state/:state",
            get(routes::alerts::get_state_alerts),
        )
        .route_layer(middleware::from_fn_with_state(
            limiter,
            services::rate_limit::enforce,
        ))
        .with_state(app_state);

    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting weather API server on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server terminated unexpectedly");
}
