use std::path::Path;

use taskbuddy::error::{Error, Result};
use taskbuddy::models::Status;

use super::{format_status, open_board, print_task};

/// Move a task to the end of another lane.
///
/// Only the lane is stored, so a position inside a lane would not outlive
/// this process; reordering is left to the web board.
pub fn run(db_path: &Path, id: &str, lane: &str, json: bool) -> Result<()> {
    let to = Status::from_str(lane)?;
    let mut board = open_board(db_path)?;
    let from = board
        .find(id)
        .map(|t| t.status)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    if from == to {
        return Err(Error::Validation(format!("task {id} is already in {}", to.label())));
    }
    let end = board.lane(to).len();
    board.move_task(id, from, to, end)?;

    let task = board
        .find(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    if json {
        print_task(task, true)
    } else {
        println!("Moved task {id} to {}", format_status(to));
        Ok(())
    }
}
