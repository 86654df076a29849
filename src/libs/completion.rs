//! Task completion and its gamification side effects.
//!
//! ## Sequence
//!
//! ```text
//! load task ──▶ flag completed ──▶ already complete? ──yes──▶ done
//!                                        │ no
//!                                        ▼
//!                         credit XP + recompute level
//!                                        │
//!                                        ▼
//!                    streak check-in (isolated, best effort)
//!                                        │
//!                                        ▼
//!            rollover if recurring (isolated, best effort)
//! ```
//!
//! Only the incomplete→complete transition awards points, touches the streak
//! or creates the next occurrence; completing an already completed task just
//! rewrites the flag. The flag and the XP credit are the minimum that must
//! succeed. The streak and rollover steps each run in their own savepoint so a
//! failure in either is logged and discarded without undoing the rest.
//!
//! The caller owns the transaction: [`crate::db::tasks::Tasks::complete`]
//! wraps the whole sequence in one immediate SQLite transaction.

use crate::db::store::RecordStore;
use crate::error::{Error, Result};
use crate::libs::level::{Gamification, GamificationPatch};
use crate::libs::messages::Message;
use crate::libs::recurrence::rollover;
use crate::libs::streak::{check_in, CheckIn};
use crate::libs::task::{Task, TaskPatch};
use crate::{msg_debug, msg_warning};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

const STREAK_SAVEPOINT: &str = "completion_streak";
const ROLLOVER_SAVEPOINT: &str = "completion_rollover";

/// Outcome of one completion request.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub task: Task,
    /// False when the task had already been completed before this call.
    pub newly_completed: bool,
    /// True when the XP credit moved the user up at least one level.
    pub leveled_up: bool,
    pub gamification: Option<Gamification>,
    pub check_in: Option<CheckIn>,
    pub next_occurrence: Option<Task>,
}

/// Marks task `task_id` of `user_id` as completed at `now`.
///
/// Fails with `NotFound` when the task does not exist or belongs to someone
/// else. Store failures while flagging the task or crediting XP are returned;
/// failures of the streak and rollover steps are only logged.
pub fn complete_task<S, Tz>(store: &S, user_id: &str, task_id: i64, now: &DateTime<Tz>) -> Result<Completion>
where
    S: RecordStore,
    Tz: TimeZone,
{
    let stamp = now.with_timezone(&Utc);
    let existing = store.get_task(user_id, task_id)?.ok_or_else(|| Error::task_not_found(task_id))?;
    let was_complete = existing.completed;

    let task = store.update_task(user_id, task_id, &TaskPatch::completed(), stamp)?;

    if was_complete {
        msg_debug!(Message::TaskAlreadyCompleted(task_id));
        return Ok(Completion {
            task,
            newly_completed: false,
            leveled_up: false,
            gamification: None,
            check_in: None,
            next_occurrence: None,
        });
    }

    let mut record = store.get_gamification(user_id)?.unwrap_or_else(|| Gamification::new(user_id));
    let level_before = record.level;
    record.award(task.xp);
    let mut record = store.update_gamification(user_id, &GamificationPatch::progress(&record), stamp)?;
    let leveled_up = record.level > level_before;
    if leveled_up {
        msg_debug!(Message::LevelReached(user_id.to_string(), record.level));
    }

    let check_in = match store.isolated(STREAK_SAVEPOINT, |s| check_in(s, user_id, now)) {
        Ok(outcome) => {
            record.streak_days = outcome.streak;
            record.last_interaction = Some(now.fixed_offset());
            Some(outcome)
        }
        Err(e) => {
            msg_warning!(Message::StreakUpdateFailed(user_id.to_string(), e.to_string()));
            None
        }
    };

    let next_occurrence = if task.recurring {
        match store.isolated(ROLLOVER_SAVEPOINT, |s| rollover(s, &task, stamp)) {
            Ok(next) => {
                msg_debug!(Message::RolloverCreated(task.id, next.id, next.due_date.to_string()));
                Some(next)
            }
            Err(e) => {
                msg_warning!(Message::RolloverFailed(task.id, e.to_string()));
                None
            }
        }
    } else {
        None
    };

    Ok(Completion {
        task,
        newly_completed: true,
        leveled_up,
        gamification: Some(record),
        check_in,
        next_occurrence,
    })
}
