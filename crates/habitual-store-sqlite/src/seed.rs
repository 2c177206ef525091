//! Demo data: one user and six habits with a month of history.

use chrono::{DateTime, Duration, Utc};
use habitual_core::{
  habit::{NewHabit, Periodicity},
  store::HabitStore,
  user::{NewUser, User},
};

use crate::{Result, SqliteStore};

/// The user the demo data belongs to unless another is named.
pub const DEMO_USERNAME: &str = "admin";

/// Length of the generated history, in days.
const HISTORY_DAYS: i64 = 30;

const DEMO_HABITS: &[(&str, &str, Periodicity)] = &[
  ("Drink 1 lt of water", "Drink 1 liter of water every day", Periodicity::Daily),
  ("Walk 30 minutes", "Walk 30 minutes every day", Periodicity::Daily),
  ("Read 20 pages", "Read 20 pages of a book every day", Periodicity::Daily),
  ("Go to the pub", "Go to the pub with friends every week", Periodicity::Weekly),
  ("Swim", "Swim every week", Periodicity::Weekly),
  ("Have a shower", "Have a shower every day", Periodicity::Daily),
];

/// What [`seed_demo_data`] did.
#[derive(Debug, Clone)]
pub struct SeedReport {
  pub user:            User,
  pub habits_created:  usize,
  pub events_recorded: usize,
}

/// Check-in times for a demo habit: every day of the last month for daily
/// habits, every seventh day starting a month ago for weekly ones.
pub fn demo_check_ins(periodicity: Periodicity, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
  let start = now - Duration::days(HISTORY_DAYS);
  match periodicity {
    Periodicity::Daily => (0..=HISTORY_DAYS).map(|i| start + Duration::days(i)).collect(),
    Periodicity::Weekly => (0..=HISTORY_DAYS / 7).map(|i| start + Duration::weeks(i)).collect(),
  }
}

/// Populate demo habits for `username`, relative to `now`.
///
/// Idempotent: an existing user is reused and habits that already exist are
/// left untouched.
pub async fn seed_demo_data(
  store: &SqliteStore,
  username: &str,
  now: DateTime<Utc>,
) -> Result<SeedReport> {
  let user = match store.get_user_by_name(username).await? {
    Some(user) => user,
    None => {
      store
        .add_user(NewUser::new(username, format!("{username}@example.com")))
        .await?
    }
  };

  let mut habits_created = 0;
  let mut events_recorded = 0;

  for &(name, description, periodicity) in DEMO_HABITS {
    if store.get_habit(user.user_id, name).await?.is_some() {
      tracing::debug!(name, "demo habit already present; skipping");
      continue;
    }

    let habit = store
      .add_habit(NewHabit::new(user.user_id, name, description, periodicity))
      .await?;
    habits_created += 1;

    for at in demo_check_ins(periodicity, now) {
      store.insert_event(habit.habit_id, at).await?;
      events_recorded += 1;
    }
  }

  tracing::info!(habits_created, events_recorded, "seeded demo data");
  Ok(SeedReport { user, habits_created, events_recorded })
}
