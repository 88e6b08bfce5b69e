// app.rs - Router assembly: routes, per-route pipeline and global layers

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware::from_fn_with_state,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{jwt_auth_middleware, rate_limit_middleware, RouteClass, RouteLimit};
use crate::state::{AppState, ForumSettings};

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let mut router = Router::new()
        // Public, never limited
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(post_routes(&state))
        .merge(comment_routes(&state))
        .fallback(|| async { ApiError::not_found("Route not found") })
        .with_state(state)
        .layer(DefaultBodyLimit::max(settings.max_request_size_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    if let Some(cors) = cors_layer(&settings) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http())
}

fn post_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            enveloped(
                guard(get(handlers::posts_list), state, RouteClass::General, false)
                    .merge(guard(post(handlers::post_create), state, RouteClass::CreatePost, true)),
            ),
        )
        .route(
            "/posts/:id",
            enveloped(
                guard(get(handlers::post_show), state, RouteClass::General, false)
                    .merge(guard(delete(handlers::post_delete), state, RouteClass::General, true)),
            ),
        )
        .route(
            "/posts/:id/comments",
            enveloped(guard(post(handlers::comment_create), state, RouteClass::CreateComment, true)),
        )
        .route(
            "/posts/:id/like",
            enveloped(guard(post(handlers::post_like), state, RouteClass::Like, true)),
        )
}

fn comment_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/comments/:id",
            enveloped(guard(delete(handlers::comment_delete), state, RouteClass::General, true)),
        )
        .route(
            "/comments/:id/like",
            enveloped(guard(post(handlers::comment_like), state, RouteClass::Like, true)),
        )
}

/// Wrap one method route in its pipeline. The layer added last runs first, so the
/// rate limiter sees the request before the identity verifier does.
fn guard(
    route: MethodRouter<AppState>,
    state: &AppState,
    class: RouteClass,
    authenticated: bool,
) -> MethodRouter<AppState> {
    let route = if authenticated {
        route.route_layer(from_fn_with_state(state.verifier.clone(), jwt_auth_middleware))
    } else {
        route
    };

    route.route_layer(from_fn_with_state(RouteLimit::new(state, class), rate_limit_middleware))
}

/// Known path, unsupported method: answer 405 in the error envelope
fn enveloped(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(|| async { ApiError::method_not_allowed("Method not allowed") })
}

fn cors_layer(settings: &ForumSettings) -> Option<CorsLayer> {
    if !settings.enable_cors {
        return None;
    }

    if settings.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    use crate::auth::JwtVerifier;
    use crate::database::MemoryForumRepository;
    use crate::middleware::RateLimiter;
    use crate::notify::LogNotifier;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryForumRepository::new()),
            Arc::new(LogNotifier::new("http://localhost/forum")),
            Arc::new(RateLimiter::new()),
            Arc::new(JwtVerifier::new("router-test-secret")),
            ForumSettings::default(),
        )
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let response = build_router(state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn wrong_method_uses_error_envelope() {
        let response = build_router(state())
            .oneshot(Request::put("/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn create_post_requires_token() {
        let response = build_router(state())
            .oneshot(
                Request::post("/posts")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"T","content":"C"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        // Limited routes report their budget even when auth fails
        assert_eq!(response.headers()["ratelimit-limit"], "5");
    }

    #[tokio::test]
    async fn health_is_not_rate_limited() {
        let response = build_router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("ratelimit-limit").is_none());
    }

    #[test]
    fn cors_disabled_adds_no_layer() {
        let settings = ForumSettings {
            enable_cors: false,
            ..ForumSettings::default()
        };
        assert!(cors_layer(&settings).is_none());
    }
}
