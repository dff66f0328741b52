//! One-shot ETL: rebuild the schema and load the CSV snapshots.
//!
//! Usage: `seed [data-dir]`. Expects `users.csv`, `movies.csv` and
//! `ratings.csv` in the data directory (default `data`).

use std::path::PathBuf;

use movieflix::{config::Config, dataset, db, import, schema};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movieflix=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let data_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data".to_string()));

    let users = dataset::load_users(&data_dir.join("users.csv"))?;
    let movies = dataset::load_movies(&data_dir.join("movies.csv"))?;
    let ratings = dataset::load_ratings(&data_dir.join("ratings.csv"))?;
    tracing::info!(
        users = users.len(),
        movies = movies.len(),
        ratings = ratings.len(),
        "snapshots loaded"
    );

    let db = db::connect(&config.database_url).await?;
    schema::reset_schema(&db).await?;
    tracing::info!("schema rebuilt");

    let report = import::import(&db, users, movies, ratings).await?;
    tracing::info!(
        users_inserted = report.users_inserted,
        users_skipped = report.users_skipped,
        movies_inserted = report.movies_inserted,
        movies_skipped = report.movies_skipped,
        ratings_inserted = report.ratings_inserted,
        ratings_skipped = report.skipped_ratings.len(),
        "seed complete"
    );

    Ok(())
}
