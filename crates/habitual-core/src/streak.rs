//! Streak computation over a single habit's completion history.
//!
//! Every function here is pure: it borrows the caller's timestamps, never
//! mutates them and keeps no state between calls. Timestamps should arrive in
//! ascending order; unsorted input is sorted on a private copy.
//!
//! Before any run detection the history is collapsed to one check-in per
//! calendar period (the earliest event of each day for daily habits, of each
//! ISO week for weekly ones). Two check-ins on the same day therefore neither
//! add a streak step nor break a streak.
//!
//! Days and weeks are read off a wall clock at a caller-supplied
//! [`FixedOffset`]: 23:00 UTC on Monday is already Tuesday at `+02:00`. Pass
//! `Utc.fix()` to count in UTC.

use std::{borrow::Cow, fmt};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Periodicity;

// ─── Results ─────────────────────────────────────────────────────────────────

/// The longest contiguous run found in a history.
///
/// `start` and `end` are `None` exactly when `length == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
  pub length: u32,
  pub start:  Option<DateTime<Utc>>,
  pub end:    Option<DateTime<Utc>>,
}

impl StreakResult {
  fn single(at: DateTime<Utc>) -> Self {
    Self { length: 1, start: Some(at), end: Some(at) }
  }

  pub fn is_empty(&self) -> bool { self.length == 0 }
}

/// Whether a habit has been completed recently enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
  /// The last check-in is at most one periodicity unit old.
  OnTrack,
  /// The habit has lapsed.
  NeedsAttention,
  /// No check-ins recorded at all.
  NoData,
}

impl fmt::Display for HabitStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::OnTrack => "on track",
      Self::NeedsAttention => "needs attention",
      Self::NoData => "no data",
    })
  }
}

// ─── Normalisation ───────────────────────────────────────────────────────────

fn ascending(events: &[DateTime<Utc>]) -> Cow<'_, [DateTime<Utc>]> {
  if events.is_sorted() {
    return Cow::Borrowed(events);
  }
  tracing::warn!(
    count = events.len(),
    "completion history is not in ascending order; sorting a copy"
  );
  let mut owned = events.to_vec();
  owned.sort_unstable();
  Cow::Owned(owned)
}

/// `(period index, first instant in that period)` for every period that has
/// at least one check-in, ascending.
fn periods(
  events: &[DateTime<Utc>],
  periodicity: Periodicity,
  offset: FixedOffset,
) -> Vec<(i64, DateTime<Utc>)> {
  let events = ascending(events);
  let mut out: Vec<(i64, DateTime<Utc>)> = Vec::with_capacity(events.len());
  for &at in events.iter() {
    let period = periodicity.period_index(at, offset);
    if out.last().is_none_or(|&(last, _)| last != period) {
      out.push((period, at));
    }
  }
  out
}

/// The history collapsed to one check-in per period, ascending.
pub fn distinct_check_ins(
  events: &[DateTime<Utc>],
  periodicity: Periodicity,
  offset: FixedOffset,
) -> Vec<DateTime<Utc>> {
  periods(events, periodicity, offset)
    .into_iter()
    .map(|(_, at)| at)
    .collect()
}

// ─── Streaks ─────────────────────────────────────────────────────────────────

/// Find the longest run of check-ins spaced exactly one period apart.
///
/// When several runs share the maximal length the earliest one is reported.
pub fn compute_streak(
  events: &[DateTime<Utc>],
  periodicity: Periodicity,
  offset: FixedOffset,
) -> StreakResult {
  let periods = periods(events, periodicity, offset);
  let Some(&(_, first)) = periods.first() else {
    return StreakResult::default();
  };

  let mut best = StreakResult::single(first);
  let mut current = 1_u32;
  let mut current_start = first;

  for pair in periods.windows(2) {
    let (prev, _) = pair[0];
    let (period, at) = pair[1];

    if period - prev == 1 {
      current += 1;
      // Strictly greater: an equal-length later run must not replace the
      // earlier one.
      if current > best.length {
        best = StreakResult { length: current, start: Some(current_start), end: Some(at) };
      }
    } else {
      current = 1;
      current_start = at;
    }
  }

  best
}

/// Length of the run ending at the most recent check-in, or 0 if the habit
/// has lapsed.
///
/// Lapsing follows [`habit_status`]: the run is over once the latest
/// check-in is more than one periodicity unit older than `now`. The run
/// itself is counted in calendar periods, like [`compute_streak`].
pub fn compute_current_streak(
  events: &[DateTime<Utc>],
  periodicity: Periodicity,
  offset: FixedOffset,
  now: DateTime<Utc>,
) -> u32 {
  if habit_status(events, periodicity, now) != HabitStatus::OnTrack {
    return 0;
  }

  let trailing = periods(events, periodicity, offset)
    .windows(2)
    .rev()
    .take_while(|pair| pair[1].0 - pair[0].0 == 1)
    .count();
  u32::try_from(trailing).map_or(u32::MAX, |n| n.saturating_add(1))
}

/// Classify a habit by the age of its latest check-in.
///
/// Compares the exact elapsed time since the latest event against one
/// periodicity unit, inclusive.
pub fn habit_status(
  events: &[DateTime<Utc>],
  periodicity: Periodicity,
  now: DateTime<Utc>,
) -> HabitStatus {
  match events.iter().max() {
    None => HabitStatus::NoData,
    Some(&last) if now - last <= periodicity.unit() => HabitStatus::OnTrack,
    Some(_) => HabitStatus::NeedsAttention,
  }
}
