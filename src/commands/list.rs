use std::path::Path;

use serde_json::json;

use taskbuddy::board::{TaskBoard, ViewFilter};
use taskbuddy::db::Database;
use taskbuddy::error::Result;
use taskbuddy::models::{CategoryFilter, DUE_DATE_FORMAT, Status, Task, ViewMode};

use super::{format_status, open_board, print_json, truncate};

const BOARD_COLUMN: usize = 30;

pub fn run(
    db_path: &Path,
    view: &str,
    category: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let view = ViewMode::from_str(view)?;
    let filter = ViewFilter::new(CategoryFilter::from_str(category)?, search.unwrap_or(""));
    let board = open_board(db_path)?;

    if json {
        return print_json(&json!({
            "todo": board.visible(Status::Todo, &filter),
            "inProgress": board.visible(Status::InProgress, &filter),
            "completed": board.visible(Status::Completed, &filter),
        }));
    }

    match view {
        ViewMode::List => print_list(&board, &filter),
        ViewMode::Board => print_board(&board, &filter),
    }
    Ok(())
}

fn print_list(board: &TaskBoard<Database>, filter: &ViewFilter) {
    for status in Status::ALL {
        let tasks = board.visible(status, filter);
        println!("{} ({})", format_status(status), tasks.len());
        if tasks.is_empty() {
            println!("  No Tasks");
        }
        for t in tasks {
            println!(
                "  {:<22} {:<40} {:<12} {}",
                t.id,
                truncate(&t.title, 38),
                t.due_date.format(DUE_DATE_FORMAT),
                t.category,
            );
        }
        println!();
    }
}

/// Lanes side by side, one column each.
fn print_board(board: &TaskBoard<Database>, filter: &ViewFilter) {
    let columns: Vec<Vec<&Task>> = Status::ALL
        .iter()
        .map(|s| board.visible(*s, filter))
        .collect();

    let header: Vec<String> = Status::ALL
        .iter()
        .zip(&columns)
        .map(|(s, tasks)| format!("{} ({})", s.label(), tasks.len()))
        .map(|h| format!("{h:<width$}", width = BOARD_COLUMN))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(BOARD_COLUMN * 3 + 6));

    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|tasks| match tasks.get(row) {
                Some(t) => {
                    let cell = format!("{} ({})", t.title, t.due_date.format(DUE_DATE_FORMAT));
                    format!("{:<width$}", truncate(&cell, BOARD_COLUMN), width = BOARD_COLUMN)
                }
                None => " ".repeat(BOARD_COLUMN),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
}
