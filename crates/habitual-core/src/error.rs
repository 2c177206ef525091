//! Error types for `habitual-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A periodicity string outside `daily` / `weekly`. The engine cannot infer
  /// an expected gap from anything else, so this is never defaulted.
  #[error("invalid periodicity: {0:?} (expected \"daily\" or \"weekly\")")]
  InvalidPeriodicity(String),

  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  #[error("user {user_id} already has a habit named {name:?}")]
  DuplicateHabit { user_id: Uuid, name: String },

  #[error("username already taken: {0:?}")]
  DuplicateUser(String),

  #[error("habit name must not be empty")]
  EmptyHabitName,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
