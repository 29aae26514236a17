mod migrations;

use std::path::Path;

pub use rusqlite;
pub use tokio_rusqlite;

use tokio_rusqlite::Connection;

use migrations::MIGRATIONS;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] rusqlite_migration::Error),
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(error) => Self::Rusqlite(error),
            tokio_rusqlite::Error::Other(error) => match error.downcast::<rusqlite_migration::Error>() {
                Ok(error) => Self::Migration(*error),
                Err(error) => Self::TokioRusqlite(tokio_rusqlite::Error::Other(error)),
            },
            error => Self::TokioRusqlite(error),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Rusqlite(error)
    }
}

/// Handle to the single writer connection. Clones share the same background thread.
pub type DB = Connection;

pub async fn init_db(path: impl AsRef<Path>) -> Result<DB> {
    let conn = Connection::open(path.as_ref()).await?;

    conn.call(|conn| {
        migrate(conn)?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;

        Ok(())
    })
    .await?;

    tracing::debug!(path = %path.as_ref().display(), "note database ready");

    Ok(conn)
}

/// Closes the connection after pending calls have run. Other clones of the handle
/// fail with `ConnectionClosed` afterwards.
pub async fn close_db(db: DB) -> Result<()> {
    db.close().await?;
    Ok(())
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    let conn = Connection::open_in_memory().await?;

    conn.call(|conn| {
        migrate(conn)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}

fn migrate(conn: &mut rusqlite::Connection) -> tokio_rusqlite::Result<()> {
    MIGRATIONS
        .to_latest(conn)
        .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}
