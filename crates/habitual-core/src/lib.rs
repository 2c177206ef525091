//! Habits, check-ins and the streak engine behind Habitual.
//!
//! [`streak`] works on bare timestamp slices; [`analytics`] runs it over a
//! user's whole habit set. Persistence lives behind [`store::HabitStore`].

// `HabitStore` spells out `+ Send` on its futures where it matters.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod error;
pub mod habit;
pub mod store;
pub mod streak;
pub mod user;

pub use error::{Error, Result};
