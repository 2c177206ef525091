//! The `HabitStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `habitual-store-sqlite`). The analytics engine never talks to a store
//! directly; callers load histories through it and hand the result to
//! [`HabitAnalytics`](crate::analytics::HabitAnalytics).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  analytics::TrackedHabit,
  habit::{CompletionEvent, Habit, HabitUpdate, NewHabit},
  user::{NewUser, User},
};

/// Abstraction over a habit-tracking storage backend.
///
/// Completion events are append-only; they disappear only when their habit
/// is removed. Absence is reported with `Option`, never with an error.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Usernames are unique.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_name<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Create a habit. Fails if the user already has a habit with that name.
  fn add_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Find a user's habit by exact name.
  fn get_habit<'a>(
    &'a self,
    user_id: Uuid,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + 'a;

  /// All habits of a user, oldest first.
  fn list_habits(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Rename, re-describe or re-periodicize a habit. Returns `None` if the
  /// habit does not exist.
  fn update_habit(
    &self,
    habit_id: Uuid,
    update: HabitUpdate,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// Delete a habit and all its completion events. Returns `false` if there
  /// was nothing to delete.
  fn remove_habit(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Completion events ─────────────────────────────────────────────────

  /// Record a check-in for a habit at `at`.
  fn insert_event(
    &self,
    habit_id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<CompletionEvent, Self::Error>> + Send + '_;

  /// Every check-in of a habit, ascending by timestamp.
  fn list_events(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CompletionEvent>, Self::Error>> + Send + '_;
}

/// Load every habit of `user_id` together with its completion timestamps.
pub async fn load_tracked_habits<S: HabitStore>(
  store: &S,
  user_id: Uuid,
) -> Result<Vec<TrackedHabit>, S::Error> {
  let habits = store.list_habits(user_id).await?;
  let mut tracked = Vec::with_capacity(habits.len());
  for habit in habits {
    let events = store
      .list_events(habit.habit_id)
      .await?
      .into_iter()
      .map(|e| e.completed_at)
      .collect();
    tracked.push(TrackedHabit::new(habit, events));
  }
  Ok(tracked)
}
