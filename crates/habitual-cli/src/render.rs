//! Plain-text grid tables for terminal output.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use unicode_width::UnicodeWidthStr as _;

/// A bordered table with a header row.
///
/// ```text
/// +-------+--------+
/// | Habit | Streak |
/// +=======+========+
/// | Swim  | 5      |
/// +-------+--------+
/// ```
pub struct Table {
  headers: Vec<String>,
  rows:    Vec<Vec<String>>,
}

impl Table {
  pub fn new<I, S>(headers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
  }

  /// Append a row. Missing cells render empty; extra cells are dropped.
  pub fn row<I, S>(&mut self, cells: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: ToString,
  {
    let mut row: Vec<String> = cells
      .into_iter()
      .take(self.headers.len())
      .map(|c| c.to_string())
      .collect();
    row.resize(self.headers.len(), String::new());
    self.rows.push(row);
    self
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  fn widths(&self) -> Vec<usize> {
    self
      .headers
      .iter()
      .enumerate()
      .map(|(i, h)| {
        self
          .rows
          .iter()
          .map(|r| r[i].width())
          .chain(std::iter::once(h.width()))
          .max()
          .unwrap_or(0)
      })
      .collect()
  }
}

fn rule(f: &mut fmt::Formatter<'_>, widths: &[usize], fill: char) -> fmt::Result {
  f.write_str("+")?;
  for w in widths {
    write!(f, "{}+", fill.to_string().repeat(w + 2))?;
  }
  writeln!(f)
}

fn line(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
  f.write_str("|")?;
  for (cell, w) in cells.iter().zip(widths) {
    let pad = w.saturating_sub(cell.width());
    write!(f, " {cell}{} |", " ".repeat(pad))?;
  }
  writeln!(f)
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let widths = self.widths();
    rule(f, &widths, '-')?;
    line(f, &widths, &self.headers)?;
    rule(f, &widths, '=')?;
    for row in &self.rows {
      line(f, &widths, row)?;
      rule(f, &widths, '-')?;
    }
    Ok(())
  }
}

/// `YYYY-MM-DD` on the wall clock at `offset`, or a dash when absent.
pub fn date(at: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
  at.map_or_else(
    || "-".to_owned(),
    |t| t.with_timezone(&offset).format("%Y-%m-%d").to_string(),
  )
}

/// `YYYY-MM-DD HH:MM` on the wall clock at `offset`.
pub fn timestamp(at: DateTime<Utc>, offset: FixedOffset) -> String {
  at.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}
