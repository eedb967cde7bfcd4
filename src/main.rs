use axum::{extract::Extension, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use warden_api::context::AppContext;
use warden_api::handlers;
use warden_api::middleware::auth::jwt_auth_middleware;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = warden_api::config::config();
    tracing::info!("Starting Warden API in {:?} mode", config.environment);

    let ctx = AppContext::from_env().await?;
    let app = app(ctx);

    // Allow tests or deployments to override port via env
    let port = std::env::var("WARDEN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Warden API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
    Ok(())
}

fn app(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(api_routes())
        .layer(Extension(ctx))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    use axum::middleware::from_fn;
    use axum::routing::{post, put};

    Router::new()
        .route("/api/auth/whoami", get(handlers::auth::whoami_get))
        .route(
            "/api/users",
            get(handlers::users::users_get).post(handlers::users::user_post),
        )
        .route("/api/users/:email/role", put(handlers::users::role_put))
        .route(
            "/api/supervisors/reassign",
            post(handlers::supervisors::reassign_post),
        )
        .route_layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Warden API",
            "version": version,
            "description": "Workforce supervision backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/whoami (protected)",
                "users": "/api/users, /api/users/:email/role (protected)",
                "supervisors": "/api/supervisors/reassign (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match warden_api::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
