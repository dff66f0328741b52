//! Read-only analytics over the tables and views. All the ranking and
//! bucketing work happens in SQL; these are thin typed wrappers.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, Statement};
use serde::Serialize;

#[derive(Debug, FromQueryResult, Serialize)]
pub struct RankedMovie {
    pub genre: String,
    pub title: String,
    pub avg_score: f64,
    pub genre_rank: i64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct PopularRow {
    pub title: String,
    pub genre: String,
    pub release_year: i32,
    pub avg_score: f64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct CountryRatings {
    pub country: String,
    pub total_ratings: i64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct MovieAgeBreakdown {
    pub title: String,
    pub avg_kids_up_to_12: Option<f64>,
    pub avg_teens_13_to_17: Option<f64>,
    pub avg_young_adults_18_to_29: Option<f64>,
    pub avg_adults_30_to_49: Option<f64>,
    pub avg_50_plus: Option<f64>,
    pub avg_overall: Option<f64>,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct GenreAgeBreakdown {
    pub genre: String,
    pub avg_kids_up_to_12: Option<f64>,
    pub avg_teens_13_to_17: Option<f64>,
    pub avg_young_adults_18_to_29: Option<f64>,
    pub avg_adults_30_to_49: Option<f64>,
    pub avg_50_plus: Option<f64>,
    pub avg_overall: Option<f64>,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct GenreAverage {
    pub genre: String,
    pub avg_score: f64,
}

/// Ten best-averaged movies inside every genre, ranked per genre.
pub async fn top_movies_by_genre(db: &DatabaseConnection) -> Result<Vec<RankedMovie>, DbErr> {
    let sql = "
        WITH ranked AS (
            SELECT
                m.genre,
                m.title,
                ROUND(AVG(r.score), 1) AS avg_score,
                ROW_NUMBER() OVER (PARTITION BY m.genre ORDER BY AVG(r.score) DESC) AS genre_rank
            FROM movies AS m
            JOIN ratings AS r ON m.id = r.movie_id
            GROUP BY m.genre, m.title
        )
        SELECT genre, title, avg_score, genre_rank
        FROM ranked
        WHERE genre_rank <= 10
        ORDER BY genre, avg_score DESC";
    RankedMovie::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

/// Five best-averaged movies overall, straight off the per-movie view.
pub async fn most_popular(db: &DatabaseConnection) -> Result<Vec<PopularRow>, DbErr> {
    let sql = "
        SELECT title, genre, release_year, avg_score
        FROM avg_rating_per_movie
        ORDER BY avg_score DESC
        LIMIT 5";
    PopularRow::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

pub async fn ratings_by_country(db: &DatabaseConnection) -> Result<Vec<CountryRatings>, DbErr> {
    let sql = "
        SELECT u.country, COUNT(r.id) AS total_ratings
        FROM ratings AS r
        JOIN users AS u ON r.user_id = u.id
        GROUP BY u.country
        ORDER BY total_ratings DESC";
    CountryRatings::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

pub async fn movie_averages_by_age(
    db: &DatabaseConnection,
) -> Result<Vec<MovieAgeBreakdown>, DbErr> {
    let sql = "SELECT * FROM avg_rating_per_movie_by_age ORDER BY title";
    MovieAgeBreakdown::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

pub async fn genre_averages_by_age(
    db: &DatabaseConnection,
) -> Result<Vec<GenreAgeBreakdown>, DbErr> {
    let sql = "SELECT * FROM avg_rating_per_genre_by_age ORDER BY genre";
    GenreAgeBreakdown::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

pub async fn best_rated_genres(db: &DatabaseConnection) -> Result<Vec<GenreAverage>, DbErr> {
    let sql = "
        SELECT m.genre, AVG(r.score) AS avg_score
        FROM movies AS m
        JOIN ratings AS r ON m.id = r.movie_id
        GROUP BY m.genre
        ORDER BY avg_score DESC";
    GenreAverage::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        sql.to_string(),
    ))
    .all(db)
    .await
}

#[cfg(test)]
mod tests {
    use jiff::{Span, Timestamp, tz::TimeZone};
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

    use super::*;
    use crate::{
        entities::{movie, rating},
        import::{self, tests::seeded_db},
        models::{MovieRecord, RatingRecord, UserRecord},
    };

    fn today_utc() -> jiff::civil::Date {
        Timestamp::now().to_zoned(TimeZone::UTC).date()
    }

    fn born_years_ago(years: i64) -> String {
        today_utc().saturating_sub(Span::new().years(years)).to_string()
    }

    fn user(handle: &str, country: &str, birth_date: String) -> UserRecord {
        UserRecord {
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
            secret: "hunter2".to_string(),
            country: country.to_string(),
            birth_date,
        }
    }

    fn movie(title: &str, genre: &str) -> MovieRecord {
        MovieRecord { title: title.to_string(), genre: genre.to_string(), release_year: 2020 }
    }

    fn rating(handle: &str, title: &str, score: f64) -> RatingRecord {
        RatingRecord { handle: handle.to_string(), title: title.to_string(), score }
    }

    #[tokio::test]
    async fn per_movie_average_is_rounded_to_one_decimal() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![
                user("a", "BR", born_years_ago(25)),
                user("b", "BR", born_years_ago(35)),
                user("c", "BR", born_years_ago(45)),
            ],
            vec![movie("X", "Drama")],
            vec![rating("a", "X", 7.0), rating("b", "X", 8.0), rating("c", "X", 9.0)],
        )
        .await
        .expect("import");

        let rows = most_popular(&db).await.expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "X");
        assert_eq!(rows[0].avg_score, 8.0);
    }

    #[tokio::test]
    async fn exact_birthday_lands_in_the_older_bracket() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![
                user("just13", "BR", born_years_ago(13)),
                user("just18", "BR", born_years_ago(18)),
            ],
            vec![movie("X", "Drama")],
            vec![rating("just13", "X", 6.0), rating("just18", "X", 8.0)],
        )
        .await
        .expect("import");

        let rows = movie_averages_by_age(&db).await.expect("query");
        assert_eq!(rows.len(), 1);
        let x = &rows[0];
        assert_eq!(x.avg_kids_up_to_12, None);
        assert_eq!(x.avg_teens_13_to_17, Some(6.0));
        assert_eq!(x.avg_young_adults_18_to_29, Some(8.0));
        assert_eq!(x.avg_adults_30_to_49, None);
        assert_eq!(x.avg_overall, Some(7.0));
    }

    #[tokio::test]
    async fn single_teen_rating_fills_only_the_teen_bracket() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![user("ana", "BR", born_years_ago(16))],
            vec![movie("X", "Drama")],
            vec![rating("ana", "X", 9.0)],
        )
        .await
        .expect("import");

        let rows = movie_averages_by_age(&db).await.expect("query");
        assert_eq!(rows.len(), 1);
        let x = &rows[0];
        assert_eq!(x.avg_teens_13_to_17, Some(9.0));
        assert_eq!(x.avg_kids_up_to_12, None);
        assert_eq!(x.avg_young_adults_18_to_29, None);
        assert_eq!(x.avg_adults_30_to_49, None);
        assert_eq!(x.avg_50_plus, None);
        assert_eq!(x.avg_overall, Some(9.0));
    }

    #[tokio::test]
    async fn movie_without_ratings_still_appears_in_the_age_view() {
        let db = seeded_db().await;
        import::import(&db, vec![], vec![movie("Unseen", "Drama")], vec![])
            .await
            .expect("import");

        let rows = movie_averages_by_age(&db).await.expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Unseen");
        assert_eq!(rows[0].avg_overall, None);
    }

    #[tokio::test]
    async fn genre_view_excludes_ratings_without_a_user() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![user("ana", "BR", born_years_ago(25))],
            vec![movie("X", "Drama")],
            vec![rating("ana", "X", 8.0)],
        )
        .await
        .expect("import");

        // A rating that lost its user keeps its movie reference.
        let x = movie::Entity::find()
            .filter(movie::Column::Title.eq("X"))
            .one(&db)
            .await
            .expect("query")
            .expect("movie");
        rating::ActiveModel {
            id: Default::default(),
            user_id: Set(None),
            movie_id: Set(Some(x.id)),
            score: Set(2.0),
        }
        .insert(&db)
        .await
        .expect("insert");

        let genres = genre_averages_by_age(&db).await.expect("genre view");
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].avg_overall, Some(8.0));

        // The per-movie view keeps the orphaned rating in its overall average.
        let movies = movie_averages_by_age(&db).await.expect("movie view");
        assert_eq!(movies[0].avg_overall, Some(5.0));
    }

    #[tokio::test]
    async fn genre_ranking_is_partitioned_and_ordered() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![user("a", "BR", born_years_ago(25)), user("b", "PT", born_years_ago(30))],
            vec![
                movie("D1", "Drama"),
                movie("D2", "Drama"),
                movie("C1", "Comedy"),
            ],
            vec![
                rating("a", "D1", 6.0),
                rating("b", "D1", 7.0),
                rating("a", "D2", 9.0),
                rating("a", "C1", 5.0),
            ],
        )
        .await
        .expect("import");

        let rows = top_movies_by_genre(&db).await.expect("query");
        let drama: Vec<_> = rows.iter().filter(|r| r.genre == "Drama").collect();
        assert_eq!(drama.len(), 2);
        assert_eq!(drama[0].title, "D2");
        assert_eq!(drama[0].genre_rank, 1);
        assert_eq!(drama[0].avg_score, 9.0);
        assert_eq!(drama[1].title, "D1");
        assert_eq!(drama[1].genre_rank, 2);
        assert_eq!(drama[1].avg_score, 6.5);

        let comedy: Vec<_> = rows.iter().filter(|r| r.genre == "Comedy").collect();
        assert_eq!(comedy.len(), 1);
        assert_eq!(comedy[0].genre_rank, 1);
    }

    #[tokio::test]
    async fn ratings_are_counted_per_country() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![
                user("a", "BR", born_years_ago(25)),
                user("b", "BR", born_years_ago(30)),
                user("c", "PT", born_years_ago(40)),
            ],
            vec![movie("X", "Drama")],
            vec![rating("a", "X", 5.0), rating("b", "X", 6.0), rating("c", "X", 7.0)],
        )
        .await
        .expect("import");

        let rows = ratings_by_country(&db).await.expect("query");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "BR");
        assert_eq!(rows[0].total_ratings, 2);
        assert_eq!(rows[1].country, "PT");
        assert_eq!(rows[1].total_ratings, 1);
    }

    #[tokio::test]
    async fn genres_are_ordered_by_average_score() {
        let db = seeded_db().await;
        import::import(
            &db,
            vec![user("a", "BR", born_years_ago(25))],
            vec![movie("D1", "Drama"), movie("C1", "Comedy")],
            vec![rating("a", "D1", 9.0), rating("a", "C1", 4.0)],
        )
        .await
        .expect("import");

        let rows = best_rated_genres(&db).await.expect("query");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].genre, "Drama");
        assert_eq!(rows[0].avg_score, 9.0);
        assert_eq!(rows[1].genre, "Comedy");
    }

    #[tokio::test]
    async fn most_popular_is_capped_at_five() {
        let db = seeded_db().await;
        let movies: Vec<MovieRecord> =
            (1..=7).map(|i| movie(&format!("M{i}"), "Drama")).collect();
        let ratings: Vec<RatingRecord> =
            (1..=7).map(|i| rating("a", &format!("M{i}"), f64::from(i))).collect();
        import::import(&db, vec![user("a", "BR", born_years_ago(25))], movies, ratings)
            .await
            .expect("import");

        let rows = most_popular(&db).await.expect("query");
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].title, "M7");
        assert_eq!(rows[4].title, "M3");
    }
}
