//! Cross-habit aggregation over already-loaded histories.
//!
//! [`HabitAnalytics`] borrows a slice of [`TrackedHabit`]s and answers
//! questions about the whole set: which habit has the longest streak, how
//! habits rank against each other, which one is most neglected. It never
//! touches storage; see [`crate::store::load_tracked_habits`] for assembling
//! the input.

use chrono::{DateTime, Duration, FixedOffset, Offset as _, Utc};
use serde::Serialize;

use crate::{
  habit::{Habit, Periodicity},
  streak::{self, HabitStatus, StreakResult},
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A habit together with its completion timestamps, ascending.
#[derive(Debug, Clone)]
pub struct TrackedHabit {
  pub habit:  Habit,
  pub events: Vec<DateTime<Utc>>,
}

impl TrackedHabit {
  pub fn new(habit: Habit, events: Vec<DateTime<Utc>>) -> Self {
    Self { habit, events }
  }

  /// Longest streak, with calendar periods read at `offset`.
  pub fn streak(&self, offset: FixedOffset) -> StreakResult {
    streak::compute_streak(&self.events, self.habit.periodicity, offset)
  }

  /// The events falling inside `window`, in their original order.
  pub fn events_in(&self, window: &DateWindow) -> Vec<DateTime<Utc>> {
    self
      .events
      .iter()
      .copied()
      .filter(|at| window.contains(*at))
      .collect()
  }
}

/// An inclusive time range used to restrict histories before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl DateWindow {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end }
  }

  /// The `days` days leading up to and including `now`.
  pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
    Self::new(now - Duration::days(i64::from(days)), now)
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.start <= at && at <= self.end
  }
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// One row of [`HabitAnalytics::rank_by_longest_streak`].
#[derive(Debug, Clone, Serialize)]
pub struct RankedHabit<'a> {
  pub habit:  &'a Habit,
  pub streak: StreakResult,
}

impl RankedHabit<'_> {
  pub fn streak_length(&self) -> u32 { self.streak.length }

  pub fn start_date(&self) -> Option<DateTime<Utc>> { self.streak.start }

  pub fn end_date(&self) -> Option<DateTime<Utc>> { self.streak.end }
}

/// One row of [`HabitAnalytics::status_report`].
///
/// `current_streak` is non-zero only when `status` is
/// [`HabitStatus::OnTrack`].
#[derive(Debug, Clone, Serialize)]
pub struct StatusLine<'a> {
  pub habit:          &'a Habit,
  pub status:         HabitStatus,
  pub current_streak: u32,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Read-only analytics over a user's habits.
///
/// Calendar days and weeks are counted in UTC unless a different offset is
/// set with [`HabitAnalytics::with_offset`].
#[derive(Debug, Clone, Copy)]
pub struct HabitAnalytics<'a> {
  habits: &'a [TrackedHabit],
  offset: FixedOffset,
}

impl<'a> HabitAnalytics<'a> {
  pub fn new(habits: &'a [TrackedHabit]) -> Self {
    Self { habits, offset: Utc.fix() }
  }

  /// Count calendar periods on a wall clock at `offset` from UTC.
  pub fn with_offset(self, offset: FixedOffset) -> Self { Self { offset, ..self } }

  /// Habit names in the order they were supplied.
  pub fn list_all_habit_names(&self) -> Vec<&'a str> {
    self.habits.iter().map(|t| t.habit.name.as_str()).collect()
  }

  pub fn filter_by_periodicity(&self, periodicity: Periodicity) -> Vec<&'a str> {
    self
      .habits
      .iter()
      .filter(|t| t.habit.periodicity == periodicity)
      .map(|t| t.habit.name.as_str())
      .collect()
  }

  /// Look a habit up by exact name.
  pub fn lookup(&self, name: &str) -> Option<&'a TrackedHabit> {
    self.habits.iter().find(|t| t.habit.name == name)
  }

  /// The longest streak of any habit; 0 for an empty set.
  pub fn global_longest_streak(&self) -> u32 {
    self
      .habits
      .iter()
      .map(|t| t.streak(self.offset).length)
      .max()
      .unwrap_or(0)
  }

  /// The longest streak of the named habit; 0 if there is no such habit.
  pub fn longest_streak_for_habit(&self, name: &str) -> u32 {
    self.lookup(name).map_or(0, |t| t.streak(self.offset).length)
  }

  /// Habits with a non-empty streak, longest first, ties by name.
  ///
  /// With a `window`, each history is cut down to the events inside it before
  /// its streak is computed.
  pub fn rank_by_longest_streak(
    &self,
    window: Option<&DateWindow>,
  ) -> Vec<RankedHabit<'a>> {
    let mut ranked: Vec<RankedHabit<'a>> = self
      .habits
      .iter()
      .map(|t| {
        let streak = match window {
          Some(w) => {
            streak::compute_streak(&t.events_in(w), t.habit.periodicity, self.offset)
          }
          None => t.streak(self.offset),
        };
        RankedHabit { habit: &t.habit, streak }
      })
      .filter(|r| r.streak.length > 0)
      .collect();

    ranked.sort_by(|a, b| {
      b.streak
        .length
        .cmp(&a.streak.length)
        .then_with(|| a.habit.name.cmp(&b.habit.name))
    });

    tracing::trace!(
      habits = self.habits.len(),
      ranked = ranked.len(),
      windowed = window.is_some(),
      "ranked habits by longest streak"
    );
    ranked
  }

  /// The top-ranked habit inside `window`.
  pub fn best_in_window(&self, window: &DateWindow) -> Option<RankedHabit<'a>> {
    self.rank_by_longest_streak(Some(window)).into_iter().next()
  }

  /// The lowest-ranked habit that still has check-ins inside `window`.
  pub fn worst_in_window(&self, window: &DateWindow) -> Option<RankedHabit<'a>> {
    self.rank_by_longest_streak(Some(window)).pop()
  }

  /// The most neglected habit: the one with the fewest check-ins.
  ///
  /// Check-ins are counted once per period, so three ticks on the same day
  /// count as one. Ties go to the habit with fewer raw events, then to the
  /// name. Habits with no events at all are not candidates.
  pub fn worst_streak_habit(&self) -> Option<&'a str> {
    self
      .habits
      .iter()
      .filter(|t| !t.events.is_empty())
      .map(|t| {
        let distinct =
          streak::distinct_check_ins(&t.events, t.habit.periodicity, self.offset).len();
        (distinct, t.events.len(), t.habit.name.as_str())
      })
      .min()
      .map(|(_, _, name)| name)
  }

  /// Status and live streak for every habit, in supplied order.
  pub fn status_report(&self, now: DateTime<Utc>) -> Vec<StatusLine<'a>> {
    self
      .habits
      .iter()
      .map(|t| StatusLine {
        habit:          &t.habit,
        status:         streak::habit_status(&t.events, t.habit.periodicity, now),
        current_streak: streak::compute_current_streak(
          &t.events,
          t.habit.periodicity,
          self.offset,
          now,
        ),
      })
      .collect()
  }
}
