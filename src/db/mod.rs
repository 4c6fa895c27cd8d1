use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Category, DUE_DATE_FORMAT, Status, Task, TaskFields, TaskPatch, UserProfile};
use crate::store::{TaskStore, generate_id};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Database { conn })
    }

    /// Open a private in-memory database with the schema already applied.
    pub fn open_in_memory() -> Result<Self> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    /// Create the schema tables if they don't exist, then run any pending version-gated migrations.
    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                seq       INTEGER PRIMARY KEY AUTOINCREMENT,
                id        TEXT NOT NULL UNIQUE,
                title     TEXT NOT NULL,
                due_date  TEXT NOT NULL,
                status    TEXT NOT NULL DEFAULT 'todo',
                category  TEXT NOT NULL DEFAULT 'work'
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            ",
        )?;

        // Fresh databases start at schema version 0.
        self.conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES ('schema_version', '0')",
            [],
        )?;

        run_migrations(&self.conn)
    }

    // -- Config --

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn delete_config(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM config WHERE key = ?1", params![key])?;
        Ok(())
    }

    // -- Tasks --

    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, due_date, status, category) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id,
                task.title,
                task.due_date.format(DUE_DATE_FORMAT).to_string(),
                task.status.as_str(),
                task.category.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, due_date, status, category FROM tasks WHERE id = ?1",
                params![id],
                read_row,
            )
            .optional()?;
        Ok(row.and_then(row_to_task))
    }

    /// Every task document, in insertion order.
    pub fn all_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, due_date, status, category FROM tasks ORDER BY seq ASC")?;
        let rows = stmt.query_map([], read_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            if let Some(task) = row_to_task(row?) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    pub fn patch_task(&self, id: &str, patch: &TaskPatch) -> Result<()> {
        let mut sets = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        let mut idx = 1;

        if let Some(t) = &patch.title {
            sets.push(format!("title = ?{idx}"));
            param_values.push(Box::new(t.clone()));
            idx += 1;
        }
        if let Some(d) = patch.due_date {
            sets.push(format!("due_date = ?{idx}"));
            param_values.push(Box::new(d.format(DUE_DATE_FORMAT).to_string()));
            idx += 1;
        }
        if let Some(s) = patch.status {
            sets.push(format!("status = ?{idx}"));
            param_values.push(Box::new(s.as_str()));
            idx += 1;
        }
        if let Some(c) = patch.category {
            sets.push(format!("category = ?{idx}"));
            param_values.push(Box::new(c.as_str()));
            idx += 1;
        }

        if sets.is_empty() {
            // Nothing to write, but the document must still exist.
            return match self.get_task(id)? {
                Some(_) => Ok(()),
                None => Err(Error::NotFound(id.to_string())),
            };
        }

        let sql = format!("UPDATE tasks SET {} WHERE id = ?{idx}", sets.join(", "));
        param_values.push(Box::new(id.to_string()));

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let rows_changed = self.conn.execute(&sql, params_ref.as_slice())?;
        if rows_changed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn remove_task(&self, id: &str) -> Result<()> {
        let rows_changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if rows_changed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    // -- Session --

    /// The account currently signed in, if any.
    pub fn session_user(&self) -> Result<Option<UserProfile>> {
        let user = self
            .conn
            .query_row(
                "SELECT display_name, email, avatar_url FROM session WHERE slot = 0",
                [],
                |row| {
                    Ok(UserProfile {
                        display_name: row.get(0)?,
                        email: row.get(1)?,
                        avatar_url: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn set_session_user(&self, user: &UserProfile) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (slot, display_name, email, avatar_url, signed_in_at)
             VALUES (0, ?1, ?2, ?3, ?4)",
            params![
                user.display_name,
                user.email,
                user.avatar_url,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn clear_session_user(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}

impl TaskStore for Database {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.all_tasks()
    }

    fn create_task(&self, fields: &TaskFields) -> Result<String> {
        let id = generate_id();
        self.insert_task(&Task::from_fields(id.clone(), fields.clone()))?;
        Ok(id)
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<()> {
        self.patch_task(id, patch)
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.remove_task(id)
    }
}

/// Read the current schema version from the config table.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match value {
        Some(v) => v
            .parse::<i32>()
            .map_err(|e| Error::Store(format!("invalid schema_version value: {e}"))),
        None => Ok(0),
    }
}

/// Newest schema version `run_migrations` knows about.
pub const SCHEMA_VERSION: i32 = 1;

/// Run all pending schema migrations in order.
///
/// Version 0 is the baseline created by `migrate()`. Each later version runs
/// in its own transaction together with the `schema_version` bump.
fn run_migrations(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    // v1: signed-in account row for the local identity provider.
    if version < 1 {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS session (
                slot         INTEGER PRIMARY KEY CHECK (slot = 0),
                display_name TEXT NOT NULL,
                email        TEXT NOT NULL,
                avatar_url   TEXT,
                signed_in_at TEXT NOT NULL
            );
            UPDATE config SET value = '1' WHERE key = 'schema_version';
            ",
        )?;
        tx.commit()?;
        tracing::info!(from = version, to = 1, "migrated schema");
    }

    Ok(())
}

type RawRow = (String, String, String, String, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

/// Decode a stored document. Rows with unreadable fields are skipped, not fatal.
fn row_to_task((id, title, due, status, category): RawRow) -> Option<Task> {
    let due_date = match NaiveDate::parse_from_str(&due, DUE_DATE_FORMAT) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(%id, %due, error = %e, "skipping task with unreadable due date");
            return None;
        }
    };
    let status = match Status::from_str(&status) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(%id, error = %e, "skipping task with unknown status");
            return None;
        }
    };
    let category = match Category::from_str(&category) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(%id, error = %e, "skipping task with unknown category");
            return None;
        }
    };
    Some(Task {
        id,
        title,
        due_date,
        status,
        category,
    })
}
