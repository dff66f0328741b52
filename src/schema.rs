use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, TransactionTrait};

use crate::error::DataError;

const SCHEMA_SQL: &str = include_str!("../migrations/001_schema.sql");
const VIEWS_SQL: &str = include_str!("../migrations/002_views.sql");

/// Drop and recreate the whole schema: views in reverse dependency order,
/// then tables (ratings before users/movies), then tables and views again.
///
/// Destructive: any existing rows are gone afterwards. Runs as a single
/// transaction, so a failing statement leaves the previous schema untouched.
pub async fn reset_schema(db: &DatabaseConnection) -> Result<(), DataError> {
    let txn = db.begin().await.map_err(DataError::Schema)?;

    run_batch(&txn, SCHEMA_SQL).await?;
    run_batch(&txn, VIEWS_SQL).await?;

    txn.commit().await.map_err(DataError::Schema)
}

async fn run_batch<C: ConnectionTrait>(conn: &C, sql: &str) -> Result<(), DataError> {
    for stmt in sql.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        conn.execute(Statement::from_string(conn.get_database_backend(), stmt.to_string()))
            .await
            .map_err(DataError::Schema)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

    use super::*;
    use crate::db;

    async fn object_names(db: &DatabaseConnection, kind: &str) -> Vec<String> {
        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                format!(
                    "SELECT name FROM sqlite_master WHERE type = '{kind}' \
                     AND name NOT LIKE 'sqlite_%' ORDER BY name"
                ),
            ))
            .await
            .expect("sqlite_master query");
        rows.iter().map(|r| r.try_get::<String>("", "name").expect("name column")).collect()
    }

    #[tokio::test]
    async fn reset_creates_all_tables_and_views() {
        let db = db::connect("sqlite::memory:").await.expect("connect");
        reset_schema(&db).await.expect("reset");

        assert_eq!(object_names(&db, "table").await, vec!["movies", "ratings", "users"]);
        assert_eq!(
            object_names(&db, "view").await,
            vec![
                "avg_rating_per_genre_by_age",
                "avg_rating_per_movie",
                "avg_rating_per_movie_by_age"
            ]
        );
    }

    #[tokio::test]
    async fn reset_discards_existing_rows() {
        let db = db::connect("sqlite::memory:").await.expect("connect");
        reset_schema(&db).await.expect("first reset");

        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO users (handle, display_name, secret, country, birth_date) \
             VALUES ('ana', 'Ana', 'pw', 'BR', '2000-01-01')"
                .to_string(),
        ))
        .await
        .expect("insert");

        reset_schema(&db).await.expect("second reset");

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM users".to_string(),
            ))
            .await
            .expect("count")
            .expect("one row");
        assert_eq!(row.try_get::<i64>("", "n").expect("n"), 0);
        assert_eq!(object_names(&db, "view").await.len(), 3);
    }

    #[tokio::test]
    async fn reset_recovers_from_partial_schema() {
        let db = db::connect("sqlite::memory:").await.expect("connect");

        // Only one of the three tables exists, with a stale column set.
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "CREATE TABLE movies (id INTEGER PRIMARY KEY, name TEXT)".to_string(),
        ))
        .await
        .expect("partial table");

        reset_schema(&db).await.expect("reset");

        assert_eq!(object_names(&db, "table").await, vec!["movies", "ratings", "users"]);
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT title, genre, release_year FROM movies LIMIT 1".to_string(),
            ))
            .await
            .expect("new column set");
        assert!(row.is_none());
    }
}
