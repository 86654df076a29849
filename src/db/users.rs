//! User profiles and the daily check-in.
//!
//! A user row carries the profile fields and the gamification record side by
//! side. Registering creates the zeroed record; afterwards the numbers only
//! move through the completion processor and the streak tracker.

use super::db::Db;
use super::store::RecordStore;
use crate::error::{Error, Result};
use crate::libs::level::{Gamification, STARTING_LEVEL, STARTING_THRESHOLD};
use crate::libs::messages::Message;
use crate::libs::streak::check_in;
use crate::msg_debug;
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

const UPSERT_PROFILE: &str = "INSERT INTO users (
    id, name, email, xp, level, next_level_xp, streak_days, last_interaction, created_at, updated_at
) VALUES (?1, ?2, ?3, 0, ?4, ?5, 0, NULL, ?6, ?6)
ON CONFLICT(id) DO UPDATE SET
    name = COALESCE(excluded.name, users.name),
    email = COALESCE(excluded.email, users.email),
    updated_at = excluded.updated_at";
const SELECT_PROFILE: &str = "SELECT id, name, email, xp, level, next_level_xp, streak_days, last_interaction, \
    created_at, updated_at FROM users WHERE id = ?1";
const COUNT_COMPLETED_DUE: &str = "SELECT COUNT(*) FROM tasks WHERE owner = ?1 AND due_date = ?2 AND completed = TRUE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub xp: i64,
    pub level: i64,
    pub next_level_xp: i64,
    pub streak_days: i64,
    pub last_interaction: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn gamification(&self) -> Gamification {
        Gamification {
            user_id: self.id.clone(),
            xp: self.xp,
            level: self.level,
            next_level_xp: self.next_level_xp,
            streak_days: self.streak_days,
            last_interaction: self.last_interaction,
        }
    }
}

/// Profile fields supplied on registration. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of the standalone daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCheckIn {
    pub streak: i64,
    pub extended: bool,
    /// False when nothing was completed today and the streak was left alone.
    pub checked_in: bool,
}

fn profile_from_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        xp: row.get(3)?,
        level: row.get(4)?,
        next_level_xp: row.get(5)?,
        streak_days: row.get(6)?,
        last_interaction: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub struct Users {
    db: Db,
}

impl Users {
    pub fn new() -> Result<Self> {
        Ok(Self { db: Db::new()? })
    }

    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    /// Creates the user with a zeroed gamification record, or updates the
    /// name and email of an existing one without touching its progress.
    pub fn register(&mut self, user_id: &str, registration: &Registration) -> Result<Profile> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("user id is required"));
        }
        let now = self.db.clock.now().with_timezone(&Utc);

        self.db.conn.execute(
            UPSERT_PROFILE,
            params![
                user_id,
                registration.name,
                registration.email,
                STARTING_LEVEL,
                STARTING_THRESHOLD,
                now,
            ],
        )?;

        msg_debug!(Message::UserRegistered(user_id.to_string()));
        self.profile(user_id)
    }

    pub fn profile(&self, user_id: &str) -> Result<Profile> {
        self.db
            .conn
            .query_row(SELECT_PROFILE, params![user_id], profile_from_row)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
    }

    pub fn gamification(&self, user_id: &str) -> Result<Gamification> {
        let record = self.db.conn.get_gamification(user_id)?;
        Ok(record.unwrap_or_else(|| Gamification::new(user_id)))
    }

    /// Daily check-in.
    ///
    /// Counts only when at least one task due today has been completed;
    /// otherwise the current streak is reported unchanged and nothing is
    /// written.
    pub fn check_in(&mut self, user_id: &str) -> Result<DailyCheckIn> {
        let now = self.db.clock.now();
        let today = now.date_naive();

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let completed_today: i64 = tx.query_row(COUNT_COMPLETED_DUE, params![user_id, today], |row| row.get(0))?;

        if completed_today == 0 {
            let streak = tx.get_gamification(user_id)?.map(|g| g.streak_days).unwrap_or(0);
            msg_debug!(Message::CheckInSkipped(user_id.to_string()));
            return Ok(DailyCheckIn {
                streak,
                extended: false,
                checked_in: false,
            });
        }

        let outcome = check_in(&*tx, user_id, &now)?;
        tx.commit()?;

        Ok(DailyCheckIn {
            streak: outcome.streak,
            extended: outcome.extended,
            checked_in: true,
        })
    }
}
