//! [`SqliteStore`], the SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use habitual_core::{
  Error as CoreError,
  habit::{CompletionEvent, Habit, HabitUpdate, NewHabit},
  store::HabitStore,
  user::{NewUser, User},
};

use crate::{
  Result,
  encode::{
    RawEvent, RawHabit, RawUser, encode_dt, encode_periodicity, encode_uuid, storable,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Habitual store backed by a single SQLite file.
///
/// Cheap to clone; clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_habit_by_id(&self, habit_id: Uuid) -> Result<Option<Habit>> {
    let id_str = encode_uuid(habit_id);

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM habits WHERE habit_id = ?1", RawHabit::COLUMNS),
            rusqlite::params![id_str],
            RawHabit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  /// Whether `user_id` owns a habit called `name` other than `except`.
  async fn name_taken(
    &self,
    user_id: Uuid,
    name: &str,
    except: Option<Uuid>,
  ) -> Result<bool> {
    let user_str   = encode_uuid(user_id);
    let name       = name.to_owned();
    let except_str = except.map(encode_uuid);

    let taken = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM habits
             WHERE user_id = ?1 AND name = ?2
               AND (?3 IS NULL OR habit_id != ?3)",
            rusqlite::params![user_str, name, except_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(taken)
  }
}

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(CoreError::EmptyHabitName.into());
  }
  Ok(())
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    if self.get_user_by_name(&input.username).await?.is_some() {
      return Err(CoreError::DuplicateUser(input.username).into());
    }

    let user = User {
      user_id:    Uuid::new_v4(),
      username:   input.username,
      email:      input.email,
      created_at: storable(Utc::now()),
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, username, email, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(user_id = %user.user_id, username = %user.username, "added user");
    Ok(user)
  }

  async fn get_user_by_name(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", RawUser::COLUMNS),
            rusqlite::params![username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn add_habit(&self, input: NewHabit) -> Result<Habit> {
    validate_name(&input.name)?;
    if self.name_taken(input.user_id, &input.name, None).await? {
      return Err(
        CoreError::DuplicateHabit { user_id: input.user_id, name: input.name }.into(),
      );
    }

    let habit = Habit {
      habit_id:    Uuid::new_v4(),
      user_id:     input.user_id,
      name:        input.name,
      description: input.description,
      periodicity: input.periodicity,
      created_at:  storable(Utc::now()),
    };

    let habit_id_str    = encode_uuid(habit.habit_id);
    let user_id_str     = encode_uuid(habit.user_id);
    let name            = habit.name.clone();
    let description     = habit.description.clone();
    let periodicity_str = encode_periodicity(habit.periodicity);
    let at_str          = encode_dt(habit.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (habit_id, user_id, name, description, periodicity, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            habit_id_str,
            user_id_str,
            name,
            description,
            periodicity_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(habit_id = %habit.habit_id, name = %habit.name, "added habit");
    Ok(habit)
  }

  async fn get_habit(&self, user_id: Uuid, name: &str) -> Result<Option<Habit>> {
    let user_str = encode_uuid(user_id);
    let name     = name.to_owned();

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM habits WHERE user_id = ?1 AND name = ?2",
              RawHabit::COLUMNS
            ),
            rusqlite::params![user_str, name],
            RawHabit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn list_habits(&self, user_id: Uuid) -> Result<Vec<Habit>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at, rowid",
          RawHabit::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn update_habit(
    &self,
    habit_id: Uuid,
    update:   HabitUpdate,
  ) -> Result<Option<Habit>> {
    let Some(mut habit) = self.get_habit_by_id(habit_id).await? else {
      return Ok(None);
    };
    if update.is_empty() {
      return Ok(Some(habit));
    }

    if let Some(new_name) = &update.name {
      validate_name(new_name)?;
      if self.name_taken(habit.user_id, new_name, Some(habit_id)).await? {
        return Err(
          CoreError::DuplicateHabit { user_id: habit.user_id, name: new_name.clone() }
            .into(),
        );
      }
    }

    update.apply(&mut habit);

    let id_str          = encode_uuid(habit_id);
    let name            = habit.name.clone();
    let description     = habit.description.clone();
    let periodicity_str = encode_periodicity(habit.periodicity);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE habits SET name = ?2, description = ?3, periodicity = ?4
           WHERE habit_id = ?1",
          rusqlite::params![id_str, name, description, periodicity_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%habit_id, name = %habit.name, "updated habit");
    Ok(Some(habit))
  }

  async fn remove_habit(&self, habit_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(habit_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM habits WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    tracing::debug!(%habit_id, removed, "removed habit");
    Ok(removed > 0)
  }

  // ── Completion events ─────────────────────────────────────────────────────

  async fn insert_event(
    &self,
    habit_id: Uuid,
    at:       DateTime<Utc>,
  ) -> Result<CompletionEvent> {
    if self.get_habit_by_id(habit_id).await?.is_none() {
      return Err(CoreError::HabitNotFound(habit_id).into());
    }

    let at = storable(at);
    let event = CompletionEvent {
      event_id: Uuid::new_v4(),
      habit_id,
      completed_at: at,
    };

    let event_id_str = encode_uuid(event.event_id);
    let habit_id_str = encode_uuid(habit_id);
    let at_str       = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO completion_events (event_id, habit_id, completed_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![event_id_str, habit_id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%habit_id, completed_at = %at, "recorded completion");
    Ok(event)
  }

  async fn list_events(&self, habit_id: Uuid) -> Result<Vec<CompletionEvent>> {
    let id_str = encode_uuid(habit_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, habit_id, completed_at
           FROM completion_events
           WHERE habit_id = ?1
           ORDER BY completed_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawEvent {
              event_id:     row.get(0)?,
              habit_id:     row.get(1)?,
              completed_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
