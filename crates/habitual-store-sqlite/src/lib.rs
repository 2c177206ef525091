//! [`HabitStore`](habitual_core::store::HabitStore) on a single SQLite file,
//! plus the demo data loader used by `habitual seed`.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod seed;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
