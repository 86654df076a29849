//! Keyed record store consumed by the completion processor and streak tracker.
//!
//! The trait is the only view of persistence the core state machine has: two
//! tables (tasks and gamification records) reachable by owner and id. The
//! SQLite implementation lives on [`rusqlite::Connection`], so a
//! [`rusqlite::Transaction`] is used through deref and every call made through
//! it joins the surrounding transaction.

use super::categories::category_owned;
use super::tags::{load_tag_ids, replace_task_tags};
use super::tasks::{task_from_row, SELECT_TASK_BY_OWNER, SELECT_TASK_BY_ROLLOVER};
use crate::error::{Error, Result};
use crate::libs::level::{Gamification, GamificationPatch};
use crate::libs::task::{NewTask, Task, TaskPatch};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const INSERT_TASK: &str = "INSERT INTO tasks (
    owner, title, description, category_id, due_date, due_time, completed, xp,
    recurring, recurrence, deferred_from, priority, rollover_of, created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, FALSE, ?7, ?8, ?9, NULL, ?10, ?11, ?12, ?12)";
const INSERT_ROLLOVER_TASK: &str = "INSERT OR IGNORE INTO tasks (
    owner, title, description, category_id, due_date, due_time, completed, xp,
    recurring, recurrence, deferred_from, priority, rollover_of, created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, FALSE, ?7, ?8, ?9, NULL, ?10, ?11, ?12, ?12)";
const UPDATE_TASK: &str = "UPDATE tasks SET
    title = ?3, description = ?4, category_id = ?5, due_date = ?6, due_time = ?7,
    completed = ?8, xp = ?9, recurring = ?10, recurrence = ?11, deferred_from = ?12,
    priority = ?13, updated_at = ?14
    WHERE id = ?1 AND owner = ?2";
const SELECT_GAMIFICATION: &str =
    "SELECT id, xp, level, next_level_xp, streak_days, last_interaction FROM users WHERE id = ?1";
const UPSERT_GAMIFICATION: &str = "INSERT INTO users (
    id, xp, level, next_level_xp, streak_days, last_interaction, created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
ON CONFLICT(id) DO UPDATE SET
    xp = excluded.xp,
    level = excluded.level,
    next_level_xp = excluded.next_level_xp,
    streak_days = excluded.streak_days,
    last_interaction = excluded.last_interaction,
    updated_at = excluded.updated_at";

pub trait RecordStore {
    /// Task `id` if it exists and belongs to `owner`.
    fn get_task(&self, owner: &str, id: i64) -> Result<Option<Task>>;

    /// Applies `patch` to an owned task. Fails with `NotFound` otherwise.
    fn update_task(&self, owner: &str, id: i64, patch: &TaskPatch, now: DateTime<Utc>) -> Result<Task>;

    /// Inserts a task. A task carrying a rollover key that was already
    /// created for the same due date is returned instead of inserted twice.
    fn create_task(&self, fields: &NewTask, now: DateTime<Utc>) -> Result<Task>;

    fn get_gamification(&self, user_id: &str) -> Result<Option<Gamification>>;

    /// Applies `patch` on top of the stored record, creating a zeroed record first if none exists.
    fn update_gamification(&self, user_id: &str, patch: &GamificationPatch, now: DateTime<Utc>) -> Result<Gamification>;

    /// Runs `step` so that its writes are discarded when it fails while
    /// earlier writes stay in place.
    fn isolated<T, F>(&self, label: &str, step: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}

fn gamification_from_row(row: &Row) -> rusqlite::Result<Gamification> {
    Ok(Gamification {
        user_id: row.get(0)?,
        xp: row.get(1)?,
        level: row.get(2)?,
        next_level_xp: row.get(3)?,
        streak_days: row.get(4)?,
        last_interaction: row.get(5)?,
    })
}

impl RecordStore for Connection {
    fn get_task(&self, owner: &str, id: i64) -> Result<Option<Task>> {
        let task = self.query_row(SELECT_TASK_BY_OWNER, params![id, owner], task_from_row).optional()?;
        match task {
            Some(mut task) => {
                task.tag_ids = load_tag_ids(self, task.id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    fn update_task(&self, owner: &str, id: i64, patch: &TaskPatch, now: DateTime<Utc>) -> Result<Task> {
        patch.validate()?;
        let mut task = self.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))?;

        if let Some(title) = &patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(category_id) = patch.category_id {
            if let Some(category_id) = category_id {
                if !category_owned(self, owner, category_id)? {
                    return Err(Error::validation(format!("unknown category {}", category_id)));
                }
            }
            task.category_id = category_id;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            task.due_time = due_time;
        }
        // Completion is one-way; XP and streak side effects key off the flag.
        if let Some(completed) = patch.completed {
            task.completed |= completed;
        }
        if let Some(xp) = patch.xp {
            task.xp = xp;
        }
        if let Some(recurring) = patch.recurring {
            task.recurring = recurring;
        }
        if let Some(recurrence) = patch.recurrence {
            task.recurrence = recurrence;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if patch.deferred_from.is_some() {
            task.deferred_from = patch.deferred_from;
        }

        self.execute(
            UPDATE_TASK,
            params![
                task.id,
                owner,
                task.title,
                task.description,
                task.category_id,
                task.due_date,
                task.due_time,
                task.completed,
                task.xp,
                task.recurring,
                task.recurrence.map(|r| r.as_str()),
                task.deferred_from,
                task.priority.as_str(),
                now,
            ],
        )?;

        if let Some(tag_ids) = &patch.tag_ids {
            replace_task_tags(self, owner, task.id, tag_ids)?;
        }

        self.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))
    }

    fn create_task(&self, fields: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        let due_date = fields.validate()?;
        if let Some(category_id) = fields.category_id {
            if !category_owned(self, &fields.owner, category_id)? {
                return Err(Error::validation(format!("unknown category {}", category_id)));
            }
        }

        let statement = match fields.rollover_of {
            Some(_) => INSERT_ROLLOVER_TASK,
            None => INSERT_TASK,
        };
        let inserted = self.execute(
            statement,
            params![
                fields.owner,
                fields.title.trim(),
                fields.description,
                fields.category_id,
                due_date,
                fields.due_time,
                fields.xp_or_default(),
                fields.recurring,
                fields.recurrence.map(|r| r.as_str()),
                fields.priority.unwrap_or_default().as_str(),
                fields.rollover_of,
                now,
            ],
        )?;

        let id = match (inserted, fields.rollover_of) {
            (0, Some(source_id)) => {
                self.query_row(SELECT_TASK_BY_ROLLOVER, params![source_id, due_date, fields.owner], |row| row.get(0))?
            }
            _ => {
                let id = self.last_insert_rowid();
                replace_task_tags(self, &fields.owner, id, &fields.tag_ids)?;
                id
            }
        };

        self.get_task(&fields.owner, id)?.ok_or_else(|| Error::task_not_found(id))
    }

    fn get_gamification(&self, user_id: &str) -> Result<Option<Gamification>> {
        Ok(self.query_row(SELECT_GAMIFICATION, params![user_id], gamification_from_row).optional()?)
    }

    fn update_gamification(&self, user_id: &str, patch: &GamificationPatch, now: DateTime<Utc>) -> Result<Gamification> {
        let mut record = self.get_gamification(user_id)?.unwrap_or_else(|| Gamification::new(user_id));
        patch.apply(&mut record);

        self.execute(
            UPSERT_GAMIFICATION,
            params![
                user_id,
                record.xp,
                record.level,
                record.next_level_xp,
                record.streak_days,
                record.last_interaction,
                now,
            ],
        )?;

        Ok(record)
    }

    fn isolated<T, F>(&self, label: &str, step: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.execute_batch(&format!("SAVEPOINT {}", label))?;
        match step(self) {
            Ok(value) => {
                self.execute_batch(&format!("RELEASE {}", label))?;
                Ok(value)
            }
            Err(e) => {
                self.execute_batch(&format!("ROLLBACK TO {label}; RELEASE {label}"))?;
                Err(e)
            }
        }
    }
}
