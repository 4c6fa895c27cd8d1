use std::path::Path;

use taskbuddy::error::Result;
use taskbuddy::models::{Category, Status, TaskDraft};

use super::{open_board, print_task};

pub fn run(
    db_path: &Path,
    title: &str,
    due: &str,
    status: &str,
    category: &str,
    json: bool,
) -> Result<()> {
    let mut board = open_board(db_path)?;

    let draft = TaskDraft::new(title, due)
        .with_status(Status::from_str(status)?)
        .with_category(Category::from_str(category)?);
    let task = board.create(&draft)?;

    if json {
        print_task(&task, true)
    } else {
        println!("Created task {}: {}", task.id, task.title);
        Ok(())
    }
}
