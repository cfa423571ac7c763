//! Convenience result type alias for PulseStage.

use crate::error::AppError;

/// A specialized `Result` type for PulseStage operations.
pub type AppResult<T> = Result<T, AppError>;
