use serde::{Deserialize, Serialize};

/// Flat user row as it arrives from a CSV snapshot or any other batch
/// source. `handle` is the natural key.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub handle: String,
    pub display_name: String,
    pub secret: String,
    pub country: String,
    pub birth_date: String,
}

/// Flat movie row. `title` is the natural key.
#[derive(Clone, Debug)]
pub struct MovieRecord {
    pub title: String,
    pub genre: String,
    pub release_year: i32,
}

/// Flat rating row. References users and movies by natural key; the
/// importer resolves both to surrogate ids.
#[derive(Clone, Debug)]
pub struct RatingRecord {
    pub handle: String,
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub handle: String,
    pub display_name: String,
    pub secret: String,
    pub country: String,
    pub birth_date: String,
}

#[derive(Debug, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub release_year: i32,
}

#[derive(Debug, Deserialize)]
pub struct NewRating {
    pub user_id: i32,
    pub movie_id: i32,
    pub score: f64,
}

/// One entry of a genre's list in the `/api/top-movies-by-genre` response.
#[derive(Debug, Serialize)]
pub struct GenreRankedEntry {
    pub title: String,
    pub avg_score: f64,
    pub genre_rank: i64,
}

/// One entry of the `/api/most-popular` response, rank assigned in the
/// handler.
#[derive(Debug, Serialize)]
pub struct PopularMovie {
    pub rank: usize,
    pub title: String,
    pub genre: String,
    pub release_year: i32,
    pub avg_score: f64,
}
