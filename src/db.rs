use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use crate::error::DataError;

/// Open the database and apply the SQLite pragmas every query relies on.
///
/// The pool is pinned to a single connection: `foreign_keys` is a
/// per-connection pragma and cascade deletes depend on it.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DataError> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.max_connections(1);

    let db = Database::connect(opts).await.map_err(DataError::Connectivity)?;

    for pragma in
        ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"]
    {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string()))
            .await
            .map_err(DataError::Connectivity)?;
    }

    Ok(db)
}
