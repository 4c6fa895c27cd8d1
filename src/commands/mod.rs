pub mod add;
pub mod auth;
pub mod bulk;
pub mod edit;
pub mod init;
pub mod list;
pub mod mv;
pub mod remove;

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use taskbuddy::auth::{IdentityProvider, LocalIdentity, Session};
use taskbuddy::board::TaskBoard;
use taskbuddy::db::Database;
use taskbuddy::error::{Error, Result};
use taskbuddy::models::{DUE_DATE_FORMAT, Status, Task};

/// Open the app session (identity provider plus local profile entries).
pub fn open_session(db_path: &Path) -> Result<Session<LocalIdentity>> {
    let identity = LocalIdentity::new(Database::open(db_path)?);
    Ok(Session::new(identity, Database::open(db_path)?))
}

/// Open the board for a signed-in user and load it from the store.
pub fn open_board(db_path: &Path) -> Result<TaskBoard<Database>> {
    let identity = LocalIdentity::new(Database::open(db_path)?);
    if identity.current_user().is_none() {
        return Err(Error::Unauthorized);
    }
    let mut board = TaskBoard::new(Database::open(db_path)?);
    board.load()?;
    Ok(board)
}

/// Format a status as a colored lane label.
pub fn format_status(s: Status) -> String {
    match s {
        Status::Todo => s.label().magenta().bold().to_string(),
        Status::InProgress => s.label().cyan().bold().to_string(),
        Status::Completed => s.label().green().bold().to_string(),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one task, or its JSON form.
pub fn print_task(task: &Task, json: bool) -> Result<()> {
    if json {
        return print_json(task);
    }
    println!("ID:       {}", task.id);
    println!("Title:    {}", task.title);
    println!("Due:      {}", task.due_date.format(DUE_DATE_FORMAT));
    println!("Status:   {}", format_status(task.status));
    println!("Category: {}", task.category);
    Ok(())
}

pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
