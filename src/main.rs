//! Campus Report Portal
//!
//! A web application for institutional data collection: administrators
//! assign report tables to campus offices, office users submit rows
//! against a fixed column schema, and admins review, approve/reject, and
//! export submissions as CSV.
//!
//! ## Features
//!
//! - **Office worklist**: active assignments with due/overdue state
//! - **Admin portal**: assignments, review, user management, activity log
//! - **Campus scoping**: hub campuses see their satellite campuses

mod access;
mod config;
mod db;
mod error;
mod export;
mod handlers;
mod models;
mod reports;
mod store;
mod validation;

use access::{AccessGuard, CampusHierarchy};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use handlers::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting Campus Report Portal");
    tracing::info!("Environment: {:?}", config.environment);

    // Create database pool
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // Bootstrap super admin when none exists yet
    if let Some((username, password)) = &config.bootstrap_admin {
        handlers::auth::ensure_bootstrap_admin(&pool, username, password).await?;
    }

    // Create application state
    let state = AppState {
        pool: pool.clone(),
        guard: Arc::new(AccessGuard::new(CampusHierarchy::default_deployment())),
        session_expiry_hours: config.session_expiry_hours,
        is_production: config.is_production(),
        trusted_proxies: config.trusted_proxies.clone(),
    };

    // Build CORS layer
    let cors = if config.is_production() {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(true)
    } else {
        CorsLayer::permissive()
    };

    // Admin-only routes, gated behind the admin middleware
    let admin_routes = Router::new()
        .route("/assignments", post(handlers::assignments::create_assignment))
        .route(
            "/assignments/:id/status",
            post(handlers::assignments::update_assignment_status),
        )
        .route(
            "/submissions/:id/review",
            post(handlers::submissions::review_submission),
        )
        .route(
            "/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route("/users/:id", delete(handlers::admin::delete_user))
        .route("/activity", get(handlers::admin::list_activity))
        .route("/dashboard", get(handlers::admin::dashboard_stats))
        .route_layer(middleware::from_fn(handlers::middleware::require_admin));

    // Routes requiring any authenticated session
    let authed_routes = Router::new()
        .route("/assignments", get(handlers::assignments::list_tasks))
        .route(
            "/submissions",
            post(handlers::submissions::submit_report)
                .get(handlers::submissions::list_submissions),
        )
        .route(
            "/submissions/:id/export",
            get(handlers::submissions::export_submission),
        )
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::require_auth,
        ));

    // Public authentication routes
    let api_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .merge(authed_routes);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/", ServeDir::new(&config.frontend_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Frontend served from: {}", config.frontend_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
