//! Core library modules for orbita.
//!
//! - **Domain**: [`task`], [`level`], [`streak`], [`recurrence`] and the
//!   [`completion`] processor that ties them together
//! - **Infrastructure**: [`clock`], [`config`], [`data_storage`], [`messages`]
//! - **Presentation**: [`stats`] and the terminal [`view`]
//!
//! ## Usage
//!
//! ```rust
//! use orbita::libs::level::level_for_xp;
//! use orbita::libs::recurrence::next_due_date;
//! use orbita::libs::task::Recurrence;
//! use chrono::NaiveDate;
//!
//! assert_eq!(level_for_xp(110), (2, 250));
//!
//! let due = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let next = next_due_date(due, Some(Recurrence::Monthly));
//! assert_eq!(next, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
//! ```

pub mod clock;
pub mod completion;
pub mod config;
pub mod data_storage;
pub mod level;
pub mod messages;
pub mod recurrence;
pub mod stats;
pub mod streak;
pub mod task;
pub mod view;
