use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub mod config;
pub mod dataset;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod models;
pub mod routes;
pub mod schema;
pub mod stats;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub db: DatabaseConnection,
}
