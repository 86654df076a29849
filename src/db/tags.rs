use super::db::Db;
use crate::error::{Error, Result};
use crate::libs::messages::Message;
use crate::msg_debug;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

const INSERT_TAG: &str = "INSERT INTO tags (owner, name, color, created_at) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_TAG: &str = "UPDATE tags SET name = ?3, color = ?4 WHERE id = ?1 AND owner = ?2";
const DELETE_TAG: &str = "DELETE FROM tags WHERE id = ?1 AND owner = ?2";
const SELECT_TAGS: &str = "SELECT id, owner, name, color, created_at FROM tags WHERE owner = ?1 ORDER BY name";
const SELECT_TAG_BY_ID: &str = "SELECT id, owner, name, color, created_at FROM tags WHERE id = ?1 AND owner = ?2";
const SELECT_TAG_IDS_BY_TASK: &str = "SELECT tag_id FROM task_tags WHERE task_id = ?1 ORDER BY tag_id";
const DELETE_TASK_TAGS: &str = "DELETE FROM task_tags WHERE task_id = ?1";
// Tags of other owners silently drop out of the SELECT
const INSERT_OWNED_TASK_TAG: &str = "INSERT OR IGNORE INTO task_tags (task_id, tag_id)
    SELECT ?1, id FROM tags WHERE id = ?2 AND owner = ?3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of a tag create or update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl TagInput {
    pub fn new(name: &str, color: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            color: color.map(str::to_string),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("tag name is required"));
        }
        Ok(())
    }
}

fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Ids of the tags attached to a task.
pub(crate) fn load_tag_ids(conn: &Connection, task_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(SELECT_TAG_IDS_BY_TASK)?;
    let ids = stmt.query_map(params![task_id], |row| row.get(0))?.collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

/// Replaces the tag set of a task with the tags in `tag_ids` that `owner` owns.
pub(crate) fn replace_task_tags(conn: &Connection, owner: &str, task_id: i64, tag_ids: &[i64]) -> Result<()> {
    conn.execute(DELETE_TASK_TAGS, params![task_id])?;
    for tag_id in tag_ids {
        conn.execute(INSERT_OWNED_TASK_TAG, params![task_id, tag_id, owner])?;
    }
    Ok(())
}

fn duplicate_name(e: rusqlite::Error, name: &str) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(ref failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            Error::validation(format!("tag '{}' already exists", name))
        }
        other => other.into(),
    }
}

pub struct Tags {
    db: Db,
}

impl Tags {
    pub fn new() -> Result<Self> {
        Ok(Self { db: Db::new()? })
    }

    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    pub fn create(&mut self, owner: &str, input: &TagInput) -> Result<Tag> {
        input.validate()?;
        let name = input.name.trim();
        let now = self.db.clock.now().with_timezone(&Utc);

        self.db
            .conn
            .execute(INSERT_TAG, params![owner, name, input.color, now])
            .map_err(|e| duplicate_name(e, name))?;
        let id = self.db.conn.last_insert_rowid();

        msg_debug!(Message::TagCreated(name.to_string()));
        self.get(owner, id)
    }

    pub fn get(&self, owner: &str, id: i64) -> Result<Tag> {
        self.db
            .conn
            .query_row(SELECT_TAG_BY_ID, params![id, owner], tag_from_row)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Tag {}", id)))
    }

    pub fn list(&self, owner: &str) -> Result<Vec<Tag>> {
        let mut stmt = self.db.conn.prepare(SELECT_TAGS)?;
        let tags = stmt.query_map(params![owner], tag_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    pub fn update(&mut self, owner: &str, id: i64, input: &TagInput) -> Result<Tag> {
        input.validate()?;
        let name = input.name.trim();

        let affected = self
            .db
            .conn
            .execute(UPDATE_TAG, params![id, owner, name, input.color])
            .map_err(|e| duplicate_name(e, name))?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Tag {}", id)));
        }

        self.get(owner, id)
    }

    /// Deletes a tag; its task associations go with it.
    pub fn delete(&mut self, owner: &str, id: i64) -> Result<()> {
        let affected = self.db.conn.execute(DELETE_TAG, params![id, owner])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Tag {}", id)));
        }
        Ok(())
    }
}
