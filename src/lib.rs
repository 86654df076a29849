//! # Orbita
//!
//! A personal task and habit tracker with experience points, levels and
//! daily streaks.
//!
//! ## Features
//!
//! - **Tasks**: due dates and times, categories, tags, priorities, deferral
//!   and duplication
//! - **Recurrence**: completing a recurring task schedules its next
//!   occurrence (daily, weekly, biweekly or monthly)
//! - **Gamification**: every first completion credits the task's XP and
//!   levels the user up along a fixed threshold table
//! - **Streaks**: consecutive days with a check-in, evaluated in one
//!   configured timezone
//! - **Statistics**: completion rates, per-category counts and a seven-day chart
//! - **Surfaces**: a command-line interface and an HTTP API sharing the same
//!   SQLite store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orbita::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod error;
pub mod libs;
pub mod server;
