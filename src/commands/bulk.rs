use std::path::Path;

use taskbuddy::board::BulkOutcome;
use taskbuddy::error::Result;
use taskbuddy::models::Status;

use super::{format_status, open_board, print_json};

/// Select `ids` and set all of them to `lane`.
pub fn status(db_path: &Path, lane: &str, ids: &[String], json: bool) -> Result<()> {
    let status = Status::from_str(lane)?;
    let mut board = open_board(db_path)?;
    for id in ids {
        board.select(id)?;
    }
    let outcome = board.bulk_set_status(status);
    report(&outcome, &format!("moved to {}", format_status(status)), json)
}

/// Select `ids` and delete all of them.
pub fn delete(db_path: &Path, ids: &[String], json: bool) -> Result<()> {
    let mut board = open_board(db_path)?;
    for id in ids {
        board.select(id)?;
    }
    let outcome = board.bulk_delete();
    report(&outcome, "deleted", json)
}

fn report(outcome: &BulkOutcome, verb: &str, json: bool) -> Result<()> {
    if json {
        return print_json(outcome);
    }
    let n = outcome.succeeded.len();
    println!("{n} task{} {verb}", if n == 1 { "" } else { "s" });
    for failure in &outcome.failed {
        eprintln!("failed: {}: {}", failure.id, failure.error);
    }
    Ok(())
}
