use std::path::Path;

use taskbuddy::error::{Error, Result};
use taskbuddy::models::{Category, Status, TaskPatch, parse_due_date};

use super::{open_board, print_task};

pub fn run(
    db_path: &Path,
    id: &str,
    title: Option<&str>,
    due: Option<&str>,
    status: Option<&str>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let patch = TaskPatch {
        title: title.map(str::to_string),
        due_date: due.map(parse_due_date).transpose()?,
        status: status.map(Status::from_str).transpose()?,
        category: category.map(Category::from_str).transpose()?,
    };
    if patch.is_empty() {
        return Err(Error::Validation(
            "nothing to change (pass --title, --due, --status or --category)".to_string(),
        ));
    }

    let mut board = open_board(db_path)?;
    let task = board.update(id, &patch)?;

    if json {
        print_task(&task, true)
    } else {
        println!("Updated task {id}");
        Ok(())
    }
}
