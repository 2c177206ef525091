//! Habit and completion-event types.
//!
//! A habit is a named recurring task with a [`Periodicity`]. Completion
//! events are append-only; a habit's history is never edited, only extended
//! or deleted along with the habit itself.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

// ─── Periodicity ─────────────────────────────────────────────────────────────

/// How often a habit is expected to be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
  Daily,
  Weekly,
}

impl Periodicity {
  /// The string stored in the database and accepted on the command line.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Weekly => "weekly",
    }
  }

  /// One periodicity unit as an exact duration. Used for the lapse check in
  /// [`crate::streak::habit_status`].
  pub fn unit(self) -> Duration {
    match self {
      Self::Daily => Duration::days(1),
      Self::Weekly => Duration::weeks(1),
    }
  }

  /// Index of the calendar period containing `at`, as seen on a wall clock
  /// running at `offset` from UTC.
  ///
  /// Daily periods are calendar days; weekly periods are ISO weeks starting
  /// on Monday. Two instants fall in the same period iff their indices are
  /// equal, and adjacent periods differ by exactly one.
  pub fn period_index(self, at: DateTime<Utc>, offset: FixedOffset) -> i64 {
    let day = at.with_timezone(&offset).date_naive();
    let days = i64::from(day.num_days_from_ce());
    match self {
      Self::Daily => days,
      Self::Weekly => {
        let monday = days - i64::from(day.weekday().num_days_from_monday());
        monday.div_euclid(7)
      }
    }
  }
}

impl fmt::Display for Periodicity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Periodicity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "daily" => Ok(Self::Daily),
      "weekly" => Ok(Self::Weekly),
      _ => Err(Error::InvalidPeriodicity(s.to_owned())),
    }
  }
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A recurring task owned by one user. Names are unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:    Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  pub description: String,
  pub periodicity: Periodicity,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::HabitStore::add_habit`].
/// `created_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewHabit {
  pub user_id:     Uuid,
  pub name:        String,
  pub description: String,
  pub periodicity: Periodicity,
}

impl NewHabit {
  pub fn new(
    user_id: Uuid,
    name: impl Into<String>,
    description: impl Into<String>,
    periodicity: Periodicity,
  ) -> Self {
    Self {
      user_id,
      name: name.into(),
      description: description.into(),
      periodicity,
    }
  }
}

/// The explicit edits allowed on an existing habit. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub periodicity: Option<Periodicity>,
}

impl HabitUpdate {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.description.is_none() && self.periodicity.is_none()
  }

  /// Apply the edits to `habit` in place.
  pub fn apply(&self, habit: &mut Habit) {
    if let Some(name) = &self.name {
      habit.name.clone_from(name);
    }
    if let Some(description) = &self.description {
      habit.description.clone_from(description);
    }
    if let Some(periodicity) = self.periodicity {
      habit.periodicity = periodicity;
    }
  }
}

// ─── CompletionEvent ─────────────────────────────────────────────────────────

/// A single check-in. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
  pub event_id:     Uuid,
  pub habit_id:     Uuid,
  pub completed_at: DateTime<Utc>,
}
