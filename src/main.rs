use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use movieflix::{AppState, config::Config, db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movieflix=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let db = db::connect(&config.database_url).await?;

    let state = Arc::new(AppState { config: config.clone(), db });

    let app = Router::new()
        .route("/api/top-movies-by-genre", get(routes::top_movies_by_genre))
        .route("/api/most-popular", get(routes::most_popular))
        .route("/api/ratings-by-country", get(routes::ratings_by_country))
        .route("/api/averages-by-age", get(routes::movie_averages_by_age))
        .route("/api/genre-averages-by-age", get(routes::genre_averages_by_age))
        .route("/api/best-rated-genres", get(routes::best_rated_genres))
        .route("/api/users", post(routes::register_user))
        .route("/api/movies", post(routes::register_movie))
        .route("/api/ratings", post(routes::register_rating))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
