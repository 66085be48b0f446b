use server::clients::storage::PgnStorage;
use server::config;
use server::db;
use server::puzzle_sessions::PuzzleSessions;
use server::routes;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    // Connect to Postgres
    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run schema migrations
    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // PGN object storage + live puzzle sessions
    let storage = PgnStorage::new(&config.pgn_storage_base_url);
    tracing::info!("PGN storage base: {}", config.pgn_storage_base_url);
    let sessions = PuzzleSessions::new();

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Games — specific routes before parameterized
        .route("/api/games", get(routes::games::get_games))
        .route("/api/games/{game_id}", get(routes::games::get_game_by_id))
        .route(
            "/api/games/{game_id}/replay",
            get(routes::games::get_game_replay),
        )
        // Posts
        .route(
            "/api/posts",
            get(routes::posts::get_posts).post(routes::posts::create_post),
        )
        .route("/api/posts/{post_id}", get(routes::posts::get_post_by_id))
        // Puzzles
        .route("/api/puzzles/daily", get(routes::puzzles::get_daily_puzzle))
        .route(
            "/api/puzzles/daily/session",
            post(routes::puzzles::open_daily_session),
        )
        .route(
            "/api/puzzles/sessions/{session_id}/attempt",
            post(routes::puzzles::attempt_move),
        )
        .route(
            "/api/puzzles/sessions/{session_id}/reset",
            post(routes::puzzles::reset_session),
        )
        .route(
            "/api/puzzles",
            get(routes::puzzles::get_puzzles).post(routes::puzzles::create_puzzle),
        )
        .route(
            "/api/puzzles/{puzzle_id}",
            put(routes::puzzles::update_puzzle).delete(routes::puzzles::delete_puzzle),
        )
        // Shared state
        .layer(Extension(pool))
        .layer(Extension(storage))
        .layer(Extension(sessions))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
