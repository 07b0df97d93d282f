//! Route definitions for the gateway API.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{handlers, health, state::AppState};

/// API version advertised on every response
pub const API_VERSION: &str = "1.0.0";

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        // Conversion endpoints, one per provider
        .route("/convertText", post(handlers::convert_text))
        .route("/convertTextGemini", post(handlers::convert_text_gemini))
        .route("/convertTextChatGPT", post(handlers::convert_text_chatgpt))
        // Service endpoints
        .route("/", get(handlers::service_info))
        .route("/health", get(health::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(handlers::not_found)
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(response_header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
                .layer(response_header(header::PRAGMA, "no-cache"))
                .layer(response_header(header::EXPIRES, "0"))
                .layer(response_header(
                    HeaderName::from_static("x-api-version"),
                    API_VERSION,
                ))
                .layer(response_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                .layer(response_header(header::X_FRAME_OPTIONS, "DENY"))
                .layer(response_header(
                    header::STRICT_TRANSPORT_SECURITY,
                    "max-age=31536000; includeSubDomains",
                ))
                .layer(response_header(
                    header::REFERRER_POLICY,
                    "strict-origin-when-cross-origin",
                )),
        )
        // Add state
        .with_state(state)
}

/// CORS: any origin, GET/POST/OPTIONS
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

fn response_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::builder().build().unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-api-version"], API_VERSION);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/chat/completions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
