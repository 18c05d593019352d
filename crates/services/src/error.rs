//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `LessonSession`.
///
/// Write-through failures during event handling are logged, not returned;
/// only loading and invalid events surface here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonSessionError {
    #[error("question {index} does not exist (lesson has {count})")]
    UnknownQuestion { index: usize, count: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
