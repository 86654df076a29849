//! Recurring task rollover.
//!
//! Completing a recurring task creates its next occurrence. Monthly
//! recurrence keeps the day of month and clamps to the last day of shorter
//! months, so a task due on January 31st comes back on the last day of
//! February.

use crate::db::store::RecordStore;
use crate::error::Result;
use crate::libs::task::{Recurrence, Task};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};

/// Due date of the occurrence after one due on `due`.
///
/// A missing pattern advances by one day, like a daily task.
pub fn next_due_date(due: NaiveDate, pattern: Option<Recurrence>) -> NaiveDate {
    let next = match pattern {
        Some(Recurrence::Weekly) => due.checked_add_days(Days::new(7)),
        Some(Recurrence::Biweekly) => due.checked_add_days(Days::new(14)),
        Some(Recurrence::Monthly) => due.checked_add_months(Months::new(1)),
        Some(Recurrence::Daily) | None => due.checked_add_days(Days::new(1)),
    };
    // Only fails past the end of chrono's calendar.
    next.unwrap_or(due)
}

/// Creates the next occurrence of `task`.
///
/// The copy keeps owner, title, description, category, due time, XP, pattern
/// and priority, is always recurring and never completed, and carries no tags.
/// It is keyed on the source task and the new due date, so running rollover
/// twice for the same completion yields the same task.
pub fn rollover<S>(store: &S, task: &Task, now: DateTime<Utc>) -> Result<Task>
where
    S: RecordStore + ?Sized,
{
    let due_date = next_due_date(task.due_date, task.recurrence);
    let mut next = task.copy_for(due_date);
    next.tag_ids.clear();
    next.recurring = true;
    next.rollover_of = Some(task.id);

    store.create_task(&next, now)
}
