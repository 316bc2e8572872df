mod handlers;

use crate::config::Config;
use crate::store::SocialStore;
use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Start the API server
pub async fn start_api_server(store: Arc<SocialStore>) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Feed
        .route("/api/feed", get(handlers::feed::get_feed))
        // Post lifecycle
        .route("/api/posts", post(handlers::posts::create_post))
        .route(
            "/api/posts/:id",
            get(handlers::posts::get_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route("/api/users/:id/posts", get(handlers::posts::get_user_posts))
        .route(
            "/api/users/:id/reposts",
            get(handlers::posts::get_user_reposts),
        )
        .route("/api/users/:id/saved", get(handlers::posts::get_user_saved))
        // Interactions
        .route(
            "/api/posts/:id/like",
            post(handlers::interactions::toggle_like),
        )
        .route(
            "/api/posts/:id/repost",
            post(handlers::interactions::toggle_repost),
        )
        .route(
            "/api/posts/:id/save",
            post(handlers::interactions::toggle_save),
        )
        // Comments
        .route(
            "/api/posts/:id/comments",
            get(handlers::comments::get_thread).post(handlers::comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            delete(handlers::comments::delete_comment),
        )
        // Follow graph
        .route(
            "/api/users/:id/follow",
            post(handlers::follows::toggle_follow),
        )
        .route(
            "/api/users/:id/followers",
            get(handlers::follows::get_followers),
        )
        .route(
            "/api/users/:id/following",
            get(handlers::follows::get_following),
        )
        .route(
            "/api/users/:id/follow-stats",
            get(handlers::follows::get_follow_stats),
        )
        // Notifications
        .route(
            "/api/users/:id/notifications",
            get(handlers::notifications::get_notifications),
        )
        // Maintenance
        .route(
            "/internal/reconcile",
            post(handlers::reconcile::reconcile_counters),
        )
        // Add state and middleware
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
