use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
    sea_query::OnConflict,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    entities::{movie, rating, user},
    error::DataError,
    models::{MovieRecord, RatingRecord, UserRecord},
};

/// A rating record the importer refused to persist, with the natural key
/// that failed to resolve.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkippedRating {
    UnknownUser { handle: String },
    UnknownMovie { title: String },
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub users_inserted: u64,
    pub users_skipped: u64,
    pub movies_inserted: u64,
    pub movies_skipped: u64,
    pub ratings_inserted: u64,
    pub skipped_ratings: Vec<SkippedRating>,
}

/// Load the three record sets into a schema produced by
/// [`crate::schema::reset_schema`].
///
/// Existing rows are cleared first (ratings, users, movies, in that order),
/// then users and movies go in with their natural-key collisions skipped,
/// and finally ratings are resolved through handle→id and title→id maps
/// read back from the tables. A rating whose user or movie does not resolve
/// is skipped and reported, never a batch failure.
///
/// Users and movies commit before ratings are resolved, so ratings can only
/// ever reference committed rows. Ratings carry no natural key: without the
/// upfront clear, re-running the importer would duplicate every resolvable
/// rating record.
pub async fn import(
    db: &DatabaseConnection,
    users: Vec<UserRecord>,
    movies: Vec<MovieRecord>,
    ratings: Vec<RatingRecord>,
) -> Result<ImportReport, DataError> {
    let mut report = ImportReport::default();

    let txn = db.begin().await.map_err(DataError::Import)?;
    clear_tables(&txn).await?;
    insert_users(&txn, users, &mut report).await?;
    insert_movies(&txn, movies, &mut report).await?;
    txn.commit().await.map_err(DataError::Import)?;

    let users_by_handle: HashMap<String, i32> = user::Entity::find()
        .all(db)
        .await
        .map_err(DataError::Import)?
        .into_iter()
        .map(|u| (u.handle, u.id))
        .collect();
    let movies_by_title: HashMap<String, i32> = movie::Entity::find()
        .all(db)
        .await
        .map_err(DataError::Import)?
        .into_iter()
        .map(|m| (m.title, m.id))
        .collect();

    let txn = db.begin().await.map_err(DataError::Import)?;
    for record in ratings {
        let Some(&user_id) = users_by_handle.get(&record.handle) else {
            warn!(handle = %record.handle, "skipping rating: user not found");
            report.skipped_ratings.push(SkippedRating::UnknownUser { handle: record.handle });
            continue;
        };
        let Some(&movie_id) = movies_by_title.get(&record.title) else {
            warn!(title = %record.title, "skipping rating: movie not found");
            report.skipped_ratings.push(SkippedRating::UnknownMovie { title: record.title });
            continue;
        };

        rating::ActiveModel {
            id: Default::default(),
            user_id: Set(Some(user_id)),
            movie_id: Set(Some(movie_id)),
            score: Set(record.score),
        }
        .insert(&txn)
        .await
        .map_err(DataError::Import)?;
        report.ratings_inserted += 1;
    }
    txn.commit().await.map_err(DataError::Import)?;

    info!(
        users = report.users_inserted,
        movies = report.movies_inserted,
        ratings = report.ratings_inserted,
        skipped = report.skipped_ratings.len(),
        "import finished"
    );

    Ok(report)
}

async fn clear_tables(txn: &DatabaseTransaction) -> Result<(), DataError> {
    rating::Entity::delete_many().exec(txn).await.map_err(DataError::Import)?;
    user::Entity::delete_many().exec(txn).await.map_err(DataError::Import)?;
    movie::Entity::delete_many().exec(txn).await.map_err(DataError::Import)?;
    Ok(())
}

async fn insert_users(
    txn: &DatabaseTransaction,
    users: Vec<UserRecord>,
    report: &mut ImportReport,
) -> Result<(), DataError> {
    for record in users {
        let inserted = user::Entity::insert(user::ActiveModel {
            id: Default::default(),
            handle: Set(record.handle),
            display_name: Set(record.display_name),
            secret: Set(record.secret),
            country: Set(record.country),
            birth_date: Set(record.birth_date),
        })
        .on_conflict(OnConflict::column(user::Column::Handle).do_nothing().to_owned())
        .exec_without_returning(txn)
        .await
        .map_err(DataError::Import)?;

        if inserted == 0 {
            report.users_skipped += 1;
        } else {
            report.users_inserted += inserted;
        }
    }
    Ok(())
}

async fn insert_movies(
    txn: &DatabaseTransaction,
    movies: Vec<MovieRecord>,
    report: &mut ImportReport,
) -> Result<(), DataError> {
    for record in movies {
        let inserted = movie::Entity::insert(movie::ActiveModel {
            id: Default::default(),
            title: Set(record.title),
            genre: Set(record.genre),
            release_year: Set(record.release_year),
        })
        .on_conflict(OnConflict::column(movie::Column::Title).do_nothing().to_owned())
        .exec_without_returning(txn)
        .await
        .map_err(DataError::Import)?;

        if inserted == 0 {
            report.movies_skipped += 1;
        } else {
            report.movies_inserted += inserted;
        }
    }
    Ok(())
}
