//! Task model shared by the store, the completion processor and both surfaces.
//!
//! A [`Task`] is always owned by exactly one user. Writes go through
//! [`NewTask`] (creation) and [`TaskPatch`] (partial update); reads come back
//! as full [`Task`] values with their tag associations attached.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// XP awarded by a task created without an explicit value.
pub const DEFAULT_TASK_XP: i64 = 20;

/// Largest XP a single task may award.
pub const MAX_TASK_XP: i64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::validation(format!("unknown priority '{}'", other))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a recurring task comes back once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Biweekly => "biweekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Lenient parse used when reading stored rows: unknown patterns become `None`
    /// and later roll over by one day.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "biweekly" => Ok(Recurrence::Biweekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(Error::validation(format!("unknown recurrence pattern '{}'", other))),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
    pub completed: bool,
    pub xp: i64,
    pub recurring: bool,
    pub recurrence: Option<Recurrence>,
    /// Due date before the first deferral. Later deferrals keep it.
    pub deferred_from: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(skip)]
    pub rollover_of: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Copies the user-facing fields into a fresh, incomplete task due on `due_date`.
    ///
    /// Shared by duplication and recurrence rollover. Tags are carried along;
    /// callers that must not copy them clear `tag_ids`.
    pub fn copy_for(&self, due_date: NaiveDate) -> NewTask {
        NewTask {
            owner: self.owner.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category_id: self.category_id,
            tag_ids: self.tag_ids.clone(),
            due_date: Some(due_date),
            due_time: self.due_time,
            xp: Some(self.xp),
            recurring: self.recurring,
            recurrence: self.recurrence,
            priority: Some(self.priority),
            rollover_of: None,
        }
    }
}

/// Fields for creating a task. `due_date` is optional only so that a missing
/// value can be reported as a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewTask {
    #[serde(skip)]
    pub owner: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, alias = "tags")]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(skip)]
    pub rollover_of: Option<i64>,
}

impl NewTask {
    pub fn new(owner: &str, title: &str, due_date: NaiveDate) -> Self {
        Self {
            owner: owner.to_string(),
            title: title.to_string(),
            due_date: Some(due_date),
            ..Default::default()
        }
    }

    /// Checks required fields and returns the due date.
    pub fn validate(&self) -> Result<NaiveDate> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("title is required"));
        }
        let due_date = self.due_date.ok_or_else(|| Error::validation("due date is required"))?;
        if let Some(xp) = self.xp {
            validate_xp(xp)?;
        }
        Ok(due_date)
    }

    pub fn xp_or_default(&self) -> i64 {
        self.xp.unwrap_or(DEFAULT_TASK_XP)
    }
}

/// Partial update of a task. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, alias = "tags")]
    pub tag_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_time: Option<Option<NaiveTime>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence: Option<Option<Recurrence>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(skip)]
    pub deferred_from: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::validation("title must not be blank"));
            }
        }
        if let Some(xp) = self.xp {
            validate_xp(xp)?;
        }
        Ok(())
    }
}

fn validate_xp(xp: i64) -> Result<()> {
    if xp < 0 {
        return Err(Error::validation("xp must not be negative"));
    }
    if xp > MAX_TASK_XP {
        return Err(Error::validation(format!("xp must not exceed {}", MAX_TASK_XP)));
    }
    Ok(())
}

/// Distinguishes an absent JSON field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    All,
    Pending,
    Completed,
    Recurring,
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(TaskStatus::All),
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "recurring" => Ok(TaskStatus::Recurring),
            other => Err(Error::validation(format!("unknown status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tag_id: Option<i64>,
}

/// Accepts `HH:MM` as well as `HH:MM:SS`.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| Error::validation(format!("invalid time '{}'", value)))
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::validation(format!("invalid date '{}'", value)))
}
