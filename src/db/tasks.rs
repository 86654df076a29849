//! Task service over the SQLite store.
//!
//! Every operation takes the owner explicitly and is scoped to it: a task id
//! that belongs to somebody else behaves exactly like one that does not
//! exist. Writes run in `BEGIN IMMEDIATE` transactions so concurrent writers
//! for the same database are serialised by SQLite's busy handler.

use super::db::Db;
use super::store::RecordStore;
use super::tags::load_tag_ids;
use crate::error::{Error, Result};
use crate::libs::completion::{complete_task, Completion};
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, Recurrence, Task, TaskFilter, TaskPatch, TaskStatus};
use crate::msg_debug;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row, TransactionBehavior};

const TASK_COLUMNS: &str = "id, owner, title, description, category_id, due_date, due_time, completed, xp, \
    recurring, recurrence, deferred_from, priority, rollover_of, created_at, updated_at";
pub(crate) const SELECT_TASK_BY_OWNER: &str = "SELECT id, owner, title, description, category_id, due_date, due_time, \
    completed, xp, recurring, recurrence, deferred_from, priority, rollover_of, created_at, updated_at \
    FROM tasks WHERE id = ?1 AND owner = ?2";
pub(crate) const SELECT_TASK_BY_ROLLOVER: &str = "SELECT id FROM tasks WHERE rollover_of = ?1 AND due_date = ?2 AND owner = ?3";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1 AND owner = ?2";
const ORDER_TASKS: &str = "ORDER BY due_date, due_time IS NULL, due_time, created_at, id";

/// Maps a row selected with the full task column list. Tags are loaded separately.
pub(crate) fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let recurrence: Option<String> = row.get(10)?;
    let priority: String = row.get(12)?;

    Ok(Task {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        tag_ids: Vec::new(),
        due_date: row.get(5)?,
        due_time: row.get(6)?,
        completed: row.get(7)?,
        xp: row.get(8)?,
        recurring: row.get(9)?,
        recurrence: recurrence.as_deref().and_then(Recurrence::parse_lenient),
        deferred_from: row.get(11)?,
        priority: priority.parse().unwrap_or_default(),
        rollover_of: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub struct Tasks {
    db: Db,
}

impl Tasks {
    /// Opens the default database.
    pub fn new() -> Result<Self> {
        Ok(Self { db: Db::new()? })
    }

    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.db.clock.now()
    }

    pub fn create(&mut self, owner: &str, mut fields: NewTask) -> Result<Task> {
        fields.owner = owner.to_string();
        fields.rollover_of = None;
        let now = self.now().with_timezone(&Utc);

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let task = tx.create_task(&fields, now)?;
        tx.commit()?;

        msg_debug!(Message::TaskCreated(task.id, owner.to_string()));
        Ok(task)
    }

    pub fn get(&self, owner: &str, id: i64) -> Result<Task> {
        self.db.conn.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))
    }

    /// Tasks of `owner` matching `filter`, ordered by due date, then due time
    /// (untimed last), then creation.
    pub fn list(&self, owner: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks WHERE owner = ?", TASK_COLUMNS);
        let mut values: Vec<Value> = vec![Value::Text(owner.to_string())];

        if let Some(date) = filter.date {
            sql.push_str(" AND due_date = ?");
            values.push(Value::Text(date.format("%Y-%m-%d").to_string()));
        }
        match filter.status {
            TaskStatus::All => {}
            TaskStatus::Pending => sql.push_str(" AND completed = FALSE"),
            TaskStatus::Completed => sql.push_str(" AND completed = TRUE"),
            TaskStatus::Recurring => sql.push_str(" AND recurring = TRUE"),
        }
        if let Some(category_id) = filter.category_id {
            sql.push_str(" AND category_id = ?");
            values.push(Value::Integer(category_id));
        }
        if let Some(tag_id) = filter.tag_id {
            sql.push_str(" AND id IN (SELECT task_id FROM task_tags WHERE tag_id = ?)");
            values.push(Value::Integer(tag_id));
        }
        sql.push(' ');
        sql.push_str(ORDER_TASKS);

        let mut stmt = self.db.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            let mut task = row?;
            task.tag_ids = load_tag_ids(&self.db.conn, task.id)?;
            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Applies a partial update.
    ///
    /// Setting `completed` on a task that is not yet complete goes through the
    /// completion processor in the same transaction, so editing a task done
    /// awards XP exactly like completing it. A completed task cannot be
    /// reopened.
    pub fn edit(&mut self, owner: &str, id: i64, patch: &TaskPatch) -> Result<Task> {
        patch.validate()?;
        let now = self.now();
        let stamp = now.with_timezone(&Utc);

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = tx.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))?;
        if existing.completed && patch.completed == Some(false) {
            return Err(Error::validation(format!("task {} is already completed", id)));
        }

        let task = if patch.completed == Some(true) && !existing.completed {
            let mut rest = patch.clone();
            rest.completed = None;
            if !rest.is_empty() {
                tx.update_task(owner, id, &rest, stamp)?;
            }
            complete_task(&*tx, owner, id, &now)?.task
        } else {
            tx.update_task(owner, id, patch, stamp)?
        };
        tx.commit()?;

        Ok(task)
    }

    pub fn delete(&mut self, owner: &str, id: i64) -> Result<()> {
        let deleted = self.db.conn.execute(DELETE_TASK, params![id, owner])?;
        if deleted == 0 {
            return Err(Error::task_not_found(id));
        }

        msg_debug!(Message::TaskDeleted(id));
        Ok(())
    }

    /// Moves a task to `due_date`. The first deferral remembers the original
    /// due date; later deferrals keep it.
    pub fn defer(&mut self, owner: &str, id: i64, due_date: NaiveDate) -> Result<Task> {
        let stamp = self.now().with_timezone(&Utc);

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = tx.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))?;
        let patch = TaskPatch {
            due_date: Some(due_date),
            deferred_from: Some(existing.deferred_from.unwrap_or(existing.due_date)),
            ..Default::default()
        };
        let task = tx.update_task(owner, id, &patch, stamp)?;
        tx.commit()?;

        msg_debug!(Message::TaskDeferred(id, due_date.to_string()));
        Ok(task)
    }

    /// Copies a task, tags included, as a new incomplete task due on
    /// `due_date` (the source's due date when omitted).
    pub fn duplicate(&mut self, owner: &str, id: i64, due_date: Option<NaiveDate>) -> Result<Task> {
        let stamp = self.now().with_timezone(&Utc);

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let source = tx.get_task(owner, id)?.ok_or_else(|| Error::task_not_found(id))?;
        let copy = tx.create_task(&source.copy_for(due_date.unwrap_or(source.due_date)), stamp)?;
        tx.commit()?;

        Ok(copy)
    }

    /// Runs the completion processor for one task in a single immediate transaction.
    pub fn complete(&mut self, owner: &str, id: i64) -> Result<Completion> {
        let now = self.now();

        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let completion = complete_task(&*tx, owner, id, &now)?;
        tx.commit()?;

        Ok(completion)
    }
}
