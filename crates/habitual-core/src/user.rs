//! Users own habits; every habit belongs to exactly one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A thin identity envelope. Every habit belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HabitStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email:    String,
}

impl NewUser {
  pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
    Self { username: username.into(), email: email.into() }
  }
}
