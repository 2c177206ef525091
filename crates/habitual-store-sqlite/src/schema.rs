//! SQL schema for the Habitual SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habits (
    habit_id     TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    periodicity  TEXT NOT NULL CHECK (periodicity IN ('daily', 'weekly')),
    created_at   TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    UNIQUE (user_id, name)
);

-- Completion events are append-only.
-- Rows leave this table only through the cascade from `habits`.
CREATE TABLE IF NOT EXISTS completion_events (
    event_id      TEXT PRIMARY KEY,
    habit_id      TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    completed_at  TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS habits_user_idx  ON habits(user_id);
CREATE INDEX IF NOT EXISTS events_habit_idx ON completion_events(habit_id, completed_at);

PRAGMA user_version = 1;
";
