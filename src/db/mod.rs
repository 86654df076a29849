//! Database layer for orbita.
//!
//! Persistence is a single SQLite file managed through `rusqlite`. The schema
//! is versioned by [`migrations`] and applied whenever a [`db::Db`] is opened.
//!
//! ## Layout
//!
//! - [`store`]: the narrow [`store::RecordStore`] view the completion
//!   processor and streak tracker work against
//! - [`tasks`], [`categories`], [`tags`], [`users`]: owner-scoped services used
//!   by the CLI and the HTTP API
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orbita::db::{db::Db, tasks::Tasks};
//! use orbita::libs::task::NewTask;
//! use chrono::NaiveDate;
//!
//! let mut tasks = Tasks::with_db(Db::open("orbita.db")?);
//! let due = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let task = tasks.create("ana", NewTask::new("ana", "Water the plants", due))?;
//! let completion = tasks.complete("ana", task.id)?;
//! # Ok::<(), orbita::error::Error>(())
//! ```

/// Connection management and schema initialisation.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

/// Keyed record store used by the core state machine.
pub mod store;

/// Task CRUD, deferral, duplication and completion.
pub mod tasks;

/// Per-user categories.
pub mod categories;

/// Per-user tags and task associations.
pub mod tags;

/// Profiles, gamification records and the daily check-in.
pub mod users;
