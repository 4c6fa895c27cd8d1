use std::path::Path;

use taskbuddy::error::Result;

use super::open_board;

pub fn run(db_path: &Path, id: &str) -> Result<()> {
    let mut board = open_board(db_path)?;
    let task = board.delete(id)?;
    println!("Deleted task {}: {}", task.id, task.title);
    Ok(())
}
