//! Subcommand definitions and their handlers.

use std::{
  io::{self, Write},
  sync::Mutex,
};

use anyhow::{Context as _, Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Subcommand;
use habitual_core::{
  analytics::{DateWindow, HabitAnalytics, RankedHabit, TrackedHabit},
  habit::{Habit, HabitUpdate, NewHabit, Periodicity},
  store::{HabitStore, load_tracked_habits},
  streak,
  user::{NewUser, User},
};
use habitual_store_sqlite::{SqliteStore, seed};
use serde::Serialize;
use serde_json::json;

use crate::render::{self, Table};

/// Length of the "last month" window used by `worst-last-month`.
const MONTH_DAYS: u32 = 30;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create the configured user if it does not exist yet.
  Init {
    /// Email address stored with the user.
    #[arg(long)]
    email: Option<String>,
  },

  /// Populate six demo habits with a month of check-ins.
  Seed,

  /// Add a new habit.
  Add {
    name:        String,
    #[arg(short, long, default_value = "")]
    description: String,
    /// `daily` or `weekly`.
    #[arg(short, long)]
    periodicity: Periodicity,
  },

  /// Show one habit with its streaks and status.
  Info { name: String },

  /// Rename, re-describe or re-periodicize a habit.
  Update {
    name:        String,
    #[arg(long = "name", value_name = "NEW_NAME")]
    new_name:    Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    periodicity: Option<Periodicity>,
  },

  /// Delete a habit and all its check-ins.
  Remove { name: String },

  /// List habits, optionally only those of one periodicity.
  List {
    #[arg(short, long)]
    periodicity: Option<Periodicity>,
  },

  /// Record a check-in.
  Done {
    name: String,
    /// RFC 3339 timestamp of the check-in; defaults to now.
    #[arg(long)]
    at:   Option<DateTime<Utc>>,
  },

  /// Longest streak of one habit, or of all habits when no name is given.
  Streak { name: Option<String> },

  /// Rank habits by longest streak.
  Rank {
    /// Only consider check-ins from the last N days.
    #[arg(long, value_name = "N")]
    days: Option<u32>,
  },

  /// The habit with the fewest check-ins.
  Worst,

  /// The weakest habit over the last 30 days.
  WorstLastMonth,

  /// Status and current streak of every habit.
  Status,
}

/// Everything a handler needs.
pub struct Ctx {
  pub store:    SqliteStore,
  pub username: String,
  pub json:     bool,
  pub now:      DateTime<Utc>,
  /// Wall-clock offset that splits check-ins into days and weeks.
  pub offset:   FixedOffset,
  out:          Mutex<Box<dyn Write + Send>>,
}

impl Ctx {
  /// A context that prints to stdout.
  pub fn new(
    store: SqliteStore,
    username: String,
    json: bool,
    now: DateTime<Utc>,
    offset: FixedOffset,
  ) -> Self {
    Self {
      store,
      username,
      json,
      now,
      offset,
      out: Mutex::new(Box::new(io::stdout())),
    }
  }

  /// Send output to `out` instead of stdout.
  pub fn with_output(self, out: impl Write + Send + 'static) -> Self {
    Self { out: Mutex::new(Box::new(out)), ..self }
  }

  /// Print `value` as JSON in `--json` mode, otherwise the text from `text`.
  fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    let rendered = if self.json {
      format!("{}\n", serde_json::to_string_pretty(value)?)
    } else {
      text()
    };
    let mut out = self.out.lock().map_err(|_| anyhow!("output stream poisoned"))?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
  }

  fn analytics<'a>(&self, tracked: &'a [TrackedHabit]) -> HabitAnalytics<'a> {
    HabitAnalytics::new(tracked).with_offset(self.offset)
  }

  async fn user(&self) -> Result<User> {
    self
      .store
      .get_user_by_name(&self.username)
      .await?
      .with_context(|| {
        format!(
          "no user named {:?}; run `habitual init` or `habitual seed` first",
          self.username
        )
      })
  }

  async fn habit(&self, user: &User, name: &str) -> Result<Option<Habit>> {
    Ok(self.store.get_habit(user.user_id, name).await?)
  }

  async fn tracked(&self) -> Result<Vec<TrackedHabit>> {
    let user = self.user().await?;
    load_tracked_habits(&self.store, user.user_id)
      .await
      .context("failed to load habit histories")
  }

  fn not_found(&self, name: &str) -> Result<()> {
    self.emit(&json!({ "found": false, "name": name }), || {
      format!("No habit named {name:?}.\n")
    })
  }
}

pub async fn run(ctx: &Ctx, command: Command) -> Result<()> {
  match command {
    Command::Init { email } => init(ctx, email).await,
    Command::Seed => seed_demo(ctx).await,
    Command::Add { name, description, periodicity } => {
      add(ctx, name, description, periodicity).await
    }
    Command::Info { name } => info(ctx, &name).await,
    Command::Update { name, new_name, description, periodicity } => {
      let update = HabitUpdate { name: new_name, description, periodicity };
      update_habit(ctx, &name, update).await
    }
    Command::Remove { name } => remove(ctx, &name).await,
    Command::List { periodicity } => list(ctx, periodicity).await,
    Command::Done { name, at } => done(ctx, &name, at.unwrap_or(ctx.now)).await,
    Command::Streak { name } => streak_cmd(ctx, name.as_deref()).await,
    Command::Rank { days } => rank(ctx, days).await,
    Command::Worst => worst(ctx).await,
    Command::WorstLastMonth => worst_last_month(ctx).await,
    Command::Status => status(ctx).await,
  }
}

// ─── Users and demo data ─────────────────────────────────────────────────────

async fn init(ctx: &Ctx, email: Option<String>) -> Result<()> {
  let user = match ctx.store.get_user_by_name(&ctx.username).await? {
    Some(user) => user,
    None => {
      let email = email.unwrap_or_else(|| format!("{}@example.com", ctx.username));
      ctx.store.add_user(NewUser::new(&ctx.username, email)).await?
    }
  };
  ctx.emit(&user, || format!("User {:?} is ready.\n", user.username))
}

async fn seed_demo(ctx: &Ctx) -> Result<()> {
  let report = seed::seed_demo_data(&ctx.store, &ctx.username, ctx.now)
    .await
    .context("failed to seed demo data")?;

  let value = json!({
    "user": report.user.username,
    "habits_created": report.habits_created,
    "events_recorded": report.events_recorded,
  });
  ctx.emit(&value, || {
    format!(
      "Seeded {} habits with {} check-ins for {:?}.\n",
      report.habits_created, report.events_recorded, report.user.username
    )
  })
}

// ─── Habit management ────────────────────────────────────────────────────────

async fn add(
  ctx: &Ctx,
  name: String,
  description: String,
  periodicity: Periodicity,
) -> Result<()> {
  let user = ctx.user().await?;
  let habit = ctx
    .store
    .add_habit(NewHabit::new(user.user_id, name, description, periodicity))
    .await?;
  ctx.emit(&habit, || format!("Added {} habit {:?}.\n", habit.periodicity, habit.name))
}

async fn info(ctx: &Ctx, name: &str) -> Result<()> {
  let user = ctx.user().await?;
  let Some(habit) = ctx.habit(&user, name).await? else {
    return ctx.not_found(name);
  };

  let events: Vec<_> = ctx
    .store
    .list_events(habit.habit_id)
    .await?
    .into_iter()
    .map(|e| e.completed_at)
    .collect();

  let longest = streak::compute_streak(&events, habit.periodicity, ctx.offset);
  let current =
    streak::compute_current_streak(&events, habit.periodicity, ctx.offset, ctx.now);
  let status = streak::habit_status(&events, habit.periodicity, ctx.now);
  let check_ins = streak::distinct_check_ins(&events, habit.periodicity, ctx.offset).len();

  let value = json!({
    "habit": habit,
    "check_ins": check_ins,
    "events": events.len(),
    "longest_streak": longest,
    "current_streak": current,
    "status": status,
  });
  ctx.emit(&value, || {
    let mut table = Table::new(["Field", "Value"]);
    table
      .row(["Name", habit.name.as_str()])
      .row(["Description", habit.description.as_str()])
      .row(["Periodicity", habit.periodicity.as_str()])
      .row(["Created", render::timestamp(habit.created_at, ctx.offset).as_str()])
      .row(["Check-ins", check_ins.to_string().as_str()])
      .row(["Longest streak", longest.length.to_string().as_str()])
      .row(["Streak from", render::date(longest.start, ctx.offset).as_str()])
      .row(["Streak to", render::date(longest.end, ctx.offset).as_str()])
      .row(["Current streak", current.to_string().as_str()])
      .row(["Status", status.to_string().as_str()]);
    table.to_string()
  })
}

async fn update_habit(ctx: &Ctx, name: &str, update: HabitUpdate) -> Result<()> {
  let user = ctx.user().await?;
  let Some(habit) = ctx.habit(&user, name).await? else {
    return ctx.not_found(name);
  };

  let Some(updated) = ctx.store.update_habit(habit.habit_id, update).await? else {
    return ctx.not_found(name);
  };
  ctx.emit(&updated, || format!("Updated habit {:?}.\n", updated.name))
}

async fn remove(ctx: &Ctx, name: &str) -> Result<()> {
  let user = ctx.user().await?;
  let Some(habit) = ctx.habit(&user, name).await? else {
    return ctx.not_found(name);
  };

  let removed = ctx.store.remove_habit(habit.habit_id).await?;
  ctx.emit(&json!({ "removed": removed, "name": name }), || {
    format!("Removed habit {name:?} and its check-ins.\n")
  })
}

async fn list(ctx: &Ctx, periodicity: Option<Periodicity>) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let analytics = ctx.analytics(&tracked);

  let names = match periodicity {
    Some(p) => analytics.filter_by_periodicity(p),
    None => analytics.list_all_habit_names(),
  };
  let habits: Vec<&TrackedHabit> = names
    .iter()
    .filter_map(|name| analytics.lookup(name))
    .collect();

  let value: Vec<&Habit> = habits.iter().map(|t| &t.habit).collect();
  ctx.emit(&value, || {
    let mut table = Table::new(["Name", "Periodicity", "Description", "Check-ins", "Created"]);
    for t in &habits {
      table.row([
        t.habit.name.clone(),
        t.habit.periodicity.to_string(),
        t.habit.description.clone(),
        streak::distinct_check_ins(&t.events, t.habit.periodicity, ctx.offset)
          .len()
          .to_string(),
        render::timestamp(t.habit.created_at, ctx.offset),
      ]);
    }
    if table.is_empty() {
      return "No habits yet. Add one with `habitual add`.\n".to_owned();
    }
    table.to_string()
  })
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

async fn done(ctx: &Ctx, name: &str, at: DateTime<Utc>) -> Result<()> {
  let user = ctx.user().await?;
  let Some(habit) = ctx.habit(&user, name).await? else {
    return ctx.not_found(name);
  };

  let event = ctx.store.insert_event(habit.habit_id, at).await?;
  let events: Vec<_> = ctx
    .store
    .list_events(habit.habit_id)
    .await?
    .into_iter()
    .map(|e| e.completed_at)
    .collect();
  let current =
    streak::compute_current_streak(&events, habit.periodicity, ctx.offset, ctx.now);

  let value = json!({ "event": event, "current_streak": current });
  ctx.emit(&value, || {
    format!(
      "Marked {:?} as done at {}. Current streak: {current}.\n",
      habit.name,
      render::timestamp(event.completed_at, ctx.offset)
    )
  })
}

// ─── Analytics ───────────────────────────────────────────────────────────────

async fn streak_cmd(ctx: &Ctx, name: Option<&str>) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let analytics = ctx.analytics(&tracked);

  let Some(name) = name else {
    let longest = analytics.global_longest_streak();
    return ctx.emit(&json!({ "longest_streak": longest }), || {
      format!("Longest streak across all habits: {longest}\n")
    });
  };

  let Some(habit) = analytics.lookup(name) else {
    return ctx.not_found(name);
  };
  let result = habit.streak(ctx.offset);
  ctx.emit(&json!({ "name": name, "longest_streak": result }), || {
    if result.is_empty() {
      return format!("{name:?} has no check-ins yet.\n");
    }
    format!(
      "Longest streak for {name:?}: {} ({} to {})\n",
      result.length,
      render::date(result.start, ctx.offset),
      render::date(result.end, ctx.offset)
    )
  })
}

fn ranking_table(ranked: &[RankedHabit<'_>], offset: FixedOffset) -> String {
  let mut table = Table::new(["#", "Habit", "Periodicity", "Streak", "From", "To"]);
  for (i, r) in ranked.iter().enumerate() {
    table.row([
      (i + 1).to_string(),
      r.habit.name.clone(),
      r.habit.periodicity.to_string(),
      r.streak_length().to_string(),
      render::date(r.start_date(), offset),
      render::date(r.end_date(), offset),
    ]);
  }
  if table.is_empty() {
    return "No streaks to rank yet.\n".to_owned();
  }
  table.to_string()
}

async fn rank(ctx: &Ctx, days: Option<u32>) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let analytics = ctx.analytics(&tracked);

  let window = days.map(|d| DateWindow::last_days(ctx.now, d));
  let ranked = analytics.rank_by_longest_streak(window.as_ref());
  ctx.emit(&ranked, || ranking_table(&ranked, ctx.offset))
}

async fn worst(ctx: &Ctx) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let worst = ctx.analytics(&tracked).worst_streak_habit();

  ctx.emit(&json!({ "worst": worst }), || match worst {
    Some(name) => format!("Habit with the fewest check-ins: {name}\n"),
    None => "No check-ins recorded yet.\n".to_owned(),
  })
}

async fn worst_last_month(ctx: &Ctx) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let window = DateWindow::last_days(ctx.now, MONTH_DAYS);
  let worst = ctx.analytics(&tracked).worst_in_window(&window);

  ctx.emit(&worst, || match &worst {
    Some(r) => format!(
      "Weakest habit over the last {MONTH_DAYS} days: {} (longest streak {})\n",
      r.habit.name,
      r.streak_length()
    ),
    None => format!("No check-ins in the last {MONTH_DAYS} days.\n"),
  })
}

async fn status(ctx: &Ctx) -> Result<()> {
  let tracked = ctx.tracked().await?;
  let report = ctx.analytics(&tracked).status_report(ctx.now);

  ctx.emit(&report, || {
    let mut table = Table::new(["Habit", "Periodicity", "Status", "Current streak"]);
    for line in &report {
      table.row([
        line.habit.name.clone(),
        line.habit.periodicity.to_string(),
        line.status.to_string(),
        line.current_streak.to_string(),
      ]);
    }
    table.to_string()
  })
}
