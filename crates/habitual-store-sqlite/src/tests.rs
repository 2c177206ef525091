//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use habitual_core::{
  Error as CoreError,
  analytics::HabitAnalytics,
  habit::{HabitUpdate, NewHabit, Periodicity},
  store::{HabitStore, load_tracked_habits},
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{
  Error, SqliteStore, encode,
  seed::{DEMO_USERNAME, demo_check_ins, seed_demo_data},
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore) -> User {
  s.add_user(NewUser::new("alice", "alice@example.com"))
    .await
    .unwrap()
}

fn jan(d: u32, h: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let alice = user(&s).await;

  let fetched = s.get_user_by_name("alice").await.unwrap().unwrap();
  assert_eq!(fetched.user_id, alice.user_id);
  assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user_by_name("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s).await;

  let err = s
    .add_user(NewUser::new("alice", "other@example.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateUser(ref n)) if n == "alice"));
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_habit() {
  let s = store().await;
  let alice = user(&s).await;

  let habit = s
    .add_habit(NewHabit::new(alice.user_id, "Swim", "50 lengths", Periodicity::Weekly))
    .await
    .unwrap();

  let fetched = s.get_habit(alice.user_id, "Swim").await.unwrap().unwrap();
  assert_eq!(fetched, habit);
  assert_eq!(fetched.periodicity, Periodicity::Weekly);
}

#[tokio::test]
async fn get_habit_missing_returns_none() {
  let s = store().await;
  let alice = user(&s).await;
  assert!(s.get_habit(alice.user_id, "Swim").await.unwrap().is_none());
}

#[tokio::test]
async fn habit_names_are_unique_per_user() {
  let s = store().await;
  let alice = user(&s).await;
  let bob = s.add_user(NewUser::new("bob", "bob@example.com")).await.unwrap();

  s.add_habit(NewHabit::new(alice.user_id, "Read", "", Periodicity::Daily))
    .await
    .unwrap();

  let err = s
    .add_habit(NewHabit::new(alice.user_id, "Read", "again", Periodicity::Weekly))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateHabit { .. })));

  // A different user may reuse the name.
  s.add_habit(NewHabit::new(bob.user_id, "Read", "", Periodicity::Daily))
    .await
    .unwrap();
}

#[tokio::test]
async fn empty_habit_name_is_rejected() {
  let s = store().await;
  let alice = user(&s).await;

  let err = s
    .add_habit(NewHabit::new(alice.user_id, "  ", "", Periodicity::Daily))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::EmptyHabitName)));
}

#[tokio::test]
async fn list_habits_in_creation_order() {
  let s = store().await;
  let alice = user(&s).await;

  for name in ["Walk", "Read", "Cook"] {
    s.add_habit(NewHabit::new(alice.user_id, name, "", Periodicity::Daily))
      .await
      .unwrap();
  }

  let names: Vec<_> = s
    .list_habits(alice.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|h| h.name)
    .collect();
  assert_eq!(names, ["Walk", "Read", "Cook"]);
}

#[tokio::test]
async fn update_habit_fields() {
  let s = store().await;
  let alice = user(&s).await;
  let habit = s
    .add_habit(NewHabit::new(alice.user_id, "Jog", "5k", Periodicity::Daily))
    .await
    .unwrap();

  let updated = s
    .update_habit(habit.habit_id, HabitUpdate {
      name:        Some("Run".into()),
      description: None,
      periodicity: Some(Periodicity::Weekly),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "Run");
  assert_eq!(updated.description, "5k");
  assert_eq!(updated.periodicity, Periodicity::Weekly);

  assert!(s.get_habit(alice.user_id, "Jog").await.unwrap().is_none());
  let fetched = s.get_habit(alice.user_id, "Run").await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_missing_habit_returns_none() {
  let s = store().await;
  let result = s
    .update_habit(Uuid::new_v4(), HabitUpdate {
      name: Some("x".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn rename_onto_existing_name_is_rejected() {
  let s = store().await;
  let alice = user(&s).await;
  s.add_habit(NewHabit::new(alice.user_id, "Walk", "", Periodicity::Daily))
    .await
    .unwrap();
  let read = s
    .add_habit(NewHabit::new(alice.user_id, "Read", "", Periodicity::Daily))
    .await
    .unwrap();

  let err = s
    .update_habit(read.habit_id, HabitUpdate {
      name: Some("Walk".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateHabit { .. })));

  // Renaming to its own name is a no-op, not a conflict.
  s.update_habit(read.habit_id, HabitUpdate {
    name: Some("Read".into()),
    ..Default::default()
  })
  .await
  .unwrap()
  .unwrap();
}

#[tokio::test]
async fn remove_habit_cascades_to_events() {
  let s = store().await;
  let alice = user(&s).await;
  let habit = s
    .add_habit(NewHabit::new(alice.user_id, "Floss", "", Periodicity::Daily))
    .await
    .unwrap();
  s.insert_event(habit.habit_id, jan(1, 8)).await.unwrap();
  s.insert_event(habit.habit_id, jan(2, 8)).await.unwrap();

  assert!(s.remove_habit(habit.habit_id).await.unwrap());
  assert!(s.get_habit(alice.user_id, "Floss").await.unwrap().is_none());
  assert!(s.list_events(habit.habit_id).await.unwrap().is_empty());

  assert!(!s.remove_habit(habit.habit_id).await.unwrap());
}

// ─── Completion events ───────────────────────────────────────────────────────

#[tokio::test]
async fn events_are_listed_in_ascending_order() {
  let s = store().await;
  let alice = user(&s).await;
  let habit = s
    .add_habit(NewHabit::new(alice.user_id, "Water", "", Periodicity::Daily))
    .await
    .unwrap();

  let late = jan(3, 9) + Duration::milliseconds(250);
  for at in [jan(3, 9), jan(1, 22), late, jan(2, 6)] {
    s.insert_event(habit.habit_id, at).await.unwrap();
  }

  let times: Vec<_> = s
    .list_events(habit.habit_id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.completed_at)
    .collect();
  assert_eq!(times, [jan(1, 22), jan(2, 6), jan(3, 9), late]);
}

#[tokio::test]
async fn event_for_unknown_habit_is_rejected() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s.insert_event(missing, jan(1, 8)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::HabitNotFound(id)) if id == missing));
}

#[tokio::test]
async fn loaded_histories_feed_analytics() {
  let s = store().await;
  let alice = user(&s).await;
  let water = s
    .add_habit(NewHabit::new(alice.user_id, "Drink Water", "", Periodicity::Daily))
    .await
    .unwrap();
  for d in [1, 2, 3, 4, 5, 10] {
    s.insert_event(water.habit_id, jan(d, 8)).await.unwrap();
  }
  s.add_habit(NewHabit::new(alice.user_id, "Swim", "", Periodicity::Weekly))
    .await
    .unwrap();

  let tracked = load_tracked_habits(&s, alice.user_id).await.unwrap();
  assert_eq!(tracked.len(), 2);

  let analytics = HabitAnalytics::new(&tracked);
  assert_eq!(analytics.longest_streak_for_habit("Drink Water"), 5);
  assert_eq!(analytics.global_longest_streak(), 5);

  let ranked = analytics.rank_by_longest_streak(None);
  assert_eq!(ranked.len(), 1);
  assert_eq!(ranked[0].start_date(), Some(jan(1, 8)));
  assert_eq!(ranked[0].end_date(), Some(jan(5, 8)));
}

// ─── Column encoding ─────────────────────────────────────────────────────────

#[test]
fn timestamps_sort_lexically() {
  let early = encode::encode_dt(jan(9, 23));
  let late = encode::encode_dt(jan(10, 1) + Duration::microseconds(5));
  assert_eq!(early, "2024-01-09T23:00:00.000000Z");
  assert_eq!(early.len(), late.len());
  assert!(early < late);
}

#[test]
fn corrupt_columns_are_reported() {
  let err = encode::decode_dt("yesterday").unwrap_err();
  assert!(matches!(err, Error::Timestamp { ref value, .. } if value == "yesterday"));

  let err = encode::decode_periodicity("monthly").unwrap_err();
  assert!(matches!(err, Error::Periodicity(ref v) if v == "monthly"));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("habits.db");

  let user_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    let alice = user(&s).await;
    let habit = s
      .add_habit(NewHabit::new(alice.user_id, "Walk", "", Periodicity::Daily))
      .await
      .unwrap();
    s.insert_event(habit.habit_id, jan(1, 8)).await.unwrap();
    alice.user_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let tracked = load_tracked_habits(&s, user_id).await.unwrap();
  assert_eq!(tracked.len(), 1);
  assert_eq!(tracked[0].events, [jan(1, 8)]);
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_creates_demo_habits_once() {
  let s = store().await;
  let now = jan(31, 12);

  let first = seed_demo_data(&s, DEMO_USERNAME, now).await.unwrap();
  assert_eq!(first.user.username, DEMO_USERNAME);
  assert_eq!(first.habits_created, 6);
  assert_eq!(first.events_recorded, 4 * 31 + 2 * 5);

  let second = seed_demo_data(&s, DEMO_USERNAME, now).await.unwrap();
  assert_eq!(second.user.user_id, first.user.user_id);
  assert_eq!(second.habits_created, 0);
  assert_eq!(second.events_recorded, 0);

  let tracked = load_tracked_habits(&s, first.user.user_id).await.unwrap();
  let analytics = HabitAnalytics::new(&tracked);
  assert_eq!(analytics.longest_streak_for_habit("Walk 30 minutes"), 31);
  assert_eq!(analytics.longest_streak_for_habit("Swim"), 5);
  assert_eq!(analytics.filter_by_periodicity(Periodicity::Weekly), ["Go to the pub", "Swim"]);
}

#[test]
fn weekly_demo_check_ins_are_a_week_apart() {
  let now = jan(31, 12);
  let times = demo_check_ins(Periodicity::Weekly, now);
  assert_eq!(times.len(), 5);
  assert!(times.windows(2).all(|w| w[1] - w[0] == Duration::weeks(1)));
  assert_eq!(times[0], now - Duration::days(30));
}
