use super::db::Db;
use crate::error::{Error, Result};
use crate::libs::messages::Message;
use crate::msg_debug;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

const INSERT_CATEGORY: &str = "INSERT INTO categories (owner, name, color, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)";
const UPDATE_CATEGORY: &str = "UPDATE categories SET name = ?3, color = ?4, updated_at = ?5 WHERE id = ?1 AND owner = ?2";
const DELETE_CATEGORY: &str = "DELETE FROM categories WHERE id = ?1 AND owner = ?2";
const DETACH_TASKS: &str = "UPDATE tasks SET category_id = NULL WHERE category_id = ?1 AND owner = ?2";
const SELECT_CATEGORIES: &str = "SELECT id, owner, name, color, created_at, updated_at FROM categories WHERE owner = ?1 ORDER BY name";
const SELECT_CATEGORY_BY_ID: &str =
    "SELECT id, owner, name, color, created_at, updated_at FROM categories WHERE id = ?1 AND owner = ?2";
const COUNT_OWNED_CATEGORY: &str = "SELECT COUNT(*) FROM categories WHERE id = ?1 AND owner = ?2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a category create or update. Both fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl CategoryInput {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("category name is required"));
        }
        if self.color.trim().is_empty() {
            return Err(Error::validation("category color is required"));
        }
        Ok(())
    }
}

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn category_owned(conn: &Connection, owner: &str, id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(COUNT_OWNED_CATEGORY, params![id, owner], |row| row.get(0))?;
    Ok(count > 0)
}

pub struct Categories {
    db: Db,
}

impl Categories {
    pub fn new() -> Result<Self> {
        Ok(Self { db: Db::new()? })
    }

    pub fn with_db(db: Db) -> Self {
        Self { db }
    }

    pub fn create(&mut self, owner: &str, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        let now = self.db.clock.now().with_timezone(&Utc);

        self.db
            .conn
            .execute(INSERT_CATEGORY, params![owner, input.name.trim(), input.color.trim(), now])?;
        let id = self.db.conn.last_insert_rowid();

        msg_debug!(Message::CategoryCreated(input.name.trim().to_string()));
        self.get(owner, id)
    }

    pub fn get(&self, owner: &str, id: i64) -> Result<Category> {
        self.db
            .conn
            .query_row(SELECT_CATEGORY_BY_ID, params![id, owner], category_from_row)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))
    }

    pub fn list(&self, owner: &str) -> Result<Vec<Category>> {
        let mut stmt = self.db.conn.prepare(SELECT_CATEGORIES)?;
        let categories = stmt
            .query_map(params![owner], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub fn update(&mut self, owner: &str, id: i64, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        let now = self.db.clock.now().with_timezone(&Utc);

        let affected = self.db.conn.execute(
            UPDATE_CATEGORY,
            params![id, owner, input.name.trim(), input.color.trim(), now],
        )?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }

        self.get(owner, id)
    }

    /// Deletes a category. Its tasks stay and become uncategorised.
    pub fn delete(&mut self, owner: &str, id: i64) -> Result<()> {
        let tx = self.db.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let affected = tx.execute(DELETE_CATEGORY, params![id, owner])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        tx.execute(DETACH_TASKS, params![id, owner])?;
        tx.commit()?;

        Ok(())
    }
}
