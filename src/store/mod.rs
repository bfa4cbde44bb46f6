//! Storage seams shared by the domain repositories.
//!
//! Each domain module (`auth`, `fitness`, `recipes`) declares its repository trait
//! next to its Postgres implementation; [`memory::MemoryStore`] implements all of
//! them for tests and `STORAGE=memory` runs.

pub mod memory;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Maps a unique-constraint violation on `users.email` to [`StoreError::DuplicateEmail`].
pub(crate) fn classify_user_insert(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Database(err),
    }
}
