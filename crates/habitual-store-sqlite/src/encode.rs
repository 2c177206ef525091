//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use habitual_core::{
  habit::{CompletionEvent, Habit, Periodicity},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so values read back compare equal
/// to the ones written.
pub fn storable(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|source| Error::Timestamp { value: s.to_owned(), source })
}

// ─── Periodicity ──────────────────────────────────────────────────────────────

pub fn encode_periodicity(p: Periodicity) -> &'static str { p.as_str() }

pub fn decode_periodicity(s: &str) -> Result<Periodicity> {
  s.parse().map_err(|_| Error::Periodicity(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub email:      String,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, username, email, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:    String,
  pub user_id:     String,
  pub name:        String,
  pub description: String,
  pub periodicity: String,
  pub created_at:  String,
}

impl RawHabit {
  pub const COLUMNS: &'static str =
    "habit_id, user_id, name, description, periodicity, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      habit_id:    row.get(0)?,
      user_id:     row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      periodicity: row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id:    decode_uuid(&self.habit_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      description: self.description,
      periodicity: decode_periodicity(&self.periodicity)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `completion_events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub habit_id:     String,
  pub completed_at: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<CompletionEvent> {
    Ok(CompletionEvent {
      event_id:     decode_uuid(&self.event_id)?,
      habit_id:     decode_uuid(&self.habit_id)?,
      completed_at: decode_dt(&self.completed_at)?,
    })
  }
}
