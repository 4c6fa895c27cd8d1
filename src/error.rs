//! Error types shared by the board, the stores and the front ends.

use thiserror::Error;

/// Errors raised by board operations, stores and the identity layer.
#[derive(Error, Debug)]
pub enum Error {
    /// A task (or session) with the given id does not exist.
    #[error("task not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// The operation needs a signed-in user.
    #[error("not signed in (run `tb login` first)")]
    Unauthorized,

    /// SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Any other store-side failure.
    #[error("store error: {0}")]
    Store(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
