use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{ActiveModelTrait, Set, SqlErr};

use crate::{
    AppState,
    entities::{movie, rating, user},
    error::AppResult,
    models::{GenreRankedEntry, NewMovie, NewRating, NewUser, PopularMovie},
    stats,
};

pub async fn top_movies_by_genre(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<BTreeMap<String, Vec<GenreRankedEntry>>>> {
    let rows = stats::top_movies_by_genre(&state.db).await?;

    let mut by_genre: BTreeMap<String, Vec<GenreRankedEntry>> = BTreeMap::new();
    for row in rows {
        by_genre.entry(row.genre).or_default().push(GenreRankedEntry {
            title: row.title,
            avg_score: row.avg_score,
            genre_rank: row.genre_rank,
        });
    }

    Ok(Json(by_genre))
}

pub async fn most_popular(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<PopularMovie>>> {
    let rows = stats::most_popular(&state.db).await?;
    let out = rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| PopularMovie {
            rank: i + 1,
            title: r.title,
            genre: r.genre,
            release_year: r.release_year,
            avg_score: r.avg_score,
        })
        .collect();
    Ok(Json(out))
}

pub async fn ratings_by_country(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<stats::CountryRatings>>> {
    Ok(Json(stats::ratings_by_country(&state.db).await?))
}

pub async fn movie_averages_by_age(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<stats::MovieAgeBreakdown>>> {
    Ok(Json(stats::movie_averages_by_age(&state.db).await?))
}

pub async fn genre_averages_by_age(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<stats::GenreAgeBreakdown>>> {
    Ok(Json(stats::genre_averages_by_age(&state.db).await?))
}

pub async fn best_rated_genres(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<stats::GenreAverage>>> {
    Ok(Json(stats::best_rated_genres(&state.db).await?))
}

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> AppResult<Response> {
    let result = user::ActiveModel {
        id: Default::default(),
        handle: Set(req.handle),
        display_name: Set(req.display_name),
        secret: Set(req.secret),
        country: Set(req.country),
        birth_date: Set(req.birth_date),
    }
    .insert(&state.db)
    .await;

    match result {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": created.id, "message": "user registered" })),
        )
            .into_response()),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Ok((
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "error": "handle is already taken" })),
            )
                .into_response()),
            _ => Err(err.into()),
        },
    }
}

pub async fn register_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewMovie>,
) -> AppResult<Response> {
    let result = movie::ActiveModel {
        id: Default::default(),
        title: Set(req.title),
        genre: Set(req.genre),
        release_year: Set(req.release_year),
    }
    .insert(&state.db)
    .await;

    match result {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": created.id, "message": "movie registered" })),
        )
            .into_response()),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Ok((
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "error": "title is already registered" })),
            )
                .into_response()),
            _ => Err(err.into()),
        },
    }
}

pub async fn register_rating(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewRating>,
) -> AppResult<Response> {
    let result = rating::ActiveModel {
        id: Default::default(),
        user_id: Set(Some(req.user_id)),
        movie_id: Set(Some(req.movie_id)),
        score: Set(req.score),
    }
    .insert(&state.db)
    .await;

    match result {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": created.id, "message": "rating recorded" })),
        )
            .into_response()),
        Err(err) => match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": "user or movie does not exist" })),
            )
                .into_response()),
            _ => Err(err.into()),
        },
    }
}
