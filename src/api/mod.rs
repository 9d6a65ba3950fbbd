mod handlers;
mod middleware;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

pub use middleware::{RateLimiter, SecurityConfig};

pub fn create_router(db: Database, security: SecurityConfig) -> Router {
    // Operator routes rewrite the catalog; they sit behind the API key.
    let admin = Router::new()
        .route("/admin/seed", post(handlers::seed_all))
        .route("/admin/seed/{source}", post(handlers::reseed))
        .route("/admin/reset", post(handlers::reset))
        .route_layer(from_fn_with_state(
            security.clone(),
            middleware::auth_middleware,
        ));

    let mut api = Router::new()
        // Resources
        .route("/resources", get(handlers::list_resources))
        .route("/resources/roots", get(handlers::list_root_resources))
        .route("/resources/search", get(handlers::search_resources))
        .route("/resources/{id}", get(handlers::get_resource))
        .route("/resources/{id}/children", get(handlers::list_children))
        // Browser
        .route("/browse", get(handlers::browse))
        // Seeds
        .route("/seeds", get(handlers::list_seed_runs))
        .merge(admin)
        // Health
        .route("/health", get(handlers::health));

    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.layer(from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&security)),
        )
        .with_state(db)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
