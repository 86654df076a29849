//! Per-user statistics: totals, completion rate, progress, category
//! breakdown and a seven-day chart ending today.

use crate::db::store::RecordStore;
use crate::error::Result;
use crate::libs::level::Gamification;
use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;

/// Days shown in the activity chart, today included.
pub const CHART_DAYS: u64 = 7;

const SELECT_TOTALS: &str = "SELECT COUNT(*), COALESCE(SUM(CASE WHEN completed THEN 1 ELSE 0 END), 0)
    FROM tasks WHERE owner = ?1";
const SELECT_COMPLETED_ON: &str = "SELECT COUNT(*) FROM tasks WHERE owner = ?1 AND due_date = ?2 AND completed = TRUE";
const SELECT_CATEGORY_COUNTS: &str = "SELECT c.id, c.name, c.color, COUNT(t.id),
    COALESCE(SUM(CASE WHEN t.completed THEN 1 ELSE 0 END), 0)
    FROM categories c
    LEFT JOIN tasks t ON t.category_id = c.id AND t.owner = c.owner
    WHERE c.owner = ?1
    GROUP BY c.id, c.name, c.color
    ORDER BY c.name";
const SELECT_DAILY_COUNTS: &str = "SELECT due_date, COUNT(*), COALESCE(SUM(CASE WHEN completed THEN 1 ELSE 0 END), 0)
    FROM tasks WHERE owner = ?1 AND due_date BETWEEN ?2 AND ?3
    GROUP BY due_date";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    /// Short weekday name, `Mon` through `Sun`.
    pub weekday: String,
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    /// Percentage of all tasks that are completed, 0 without tasks.
    pub completion_rate: f64,
    pub completed_today: i64,
    pub gamification: Gamification,
    pub categories: Vec<CategoryStats>,
    /// Oldest day first, ending with `today`.
    pub last_seven_days: Vec<DayStats>,
}

impl Statistics {
    pub fn collect(conn: &Connection, user_id: &str, today: NaiveDate) -> Result<Self> {
        let (total_tasks, completed_tasks): (i64, i64) =
            conn.query_row(SELECT_TOTALS, params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let completed_today: i64 = conn.query_row(SELECT_COMPLETED_ON, params![user_id, today], |row| row.get(0))?;
        let gamification = conn.get_gamification(user_id)?.unwrap_or_else(|| Gamification::new(user_id));

        Ok(Self {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks - completed_tasks,
            completion_rate: completion_rate(completed_tasks, total_tasks),
            completed_today,
            gamification,
            categories: category_counts(conn, user_id)?,
            last_seven_days: daily_counts(conn, user_id, today)?,
        })
    }
}

pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / total as f64
}

fn category_counts(conn: &Connection, user_id: &str) -> Result<Vec<CategoryStats>> {
    let mut stmt = conn.prepare(SELECT_CATEGORY_COUNTS)?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(CategoryStats {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            total: row.get(3)?,
            completed: row.get(4)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn daily_counts(conn: &Connection, user_id: &str, today: NaiveDate) -> Result<Vec<DayStats>> {
    let first = today.checked_sub_days(Days::new(CHART_DAYS - 1)).unwrap_or(today);

    let mut stmt = conn.prepare(SELECT_DAILY_COUNTS)?;
    let counts = stmt
        .query_map(params![user_id, first, today], |row| {
            Ok((row.get::<_, NaiveDate>(0)?, (row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)))
        })?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;

    Ok(first
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            let (total, completed) = counts.get(&date).copied().unwrap_or((0, 0));
            DayStats {
                date,
                weekday: date.format("%a").to_string(),
                total,
                completed,
            }
        })
        .collect())
}
