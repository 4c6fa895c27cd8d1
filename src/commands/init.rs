use std::path::Path;

use taskbuddy::db::Database;
use taskbuddy::error::Result;

pub fn run(db_path: &Path) -> Result<()> {
    // Create the .taskbuddy directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(db_path)?;
    db.migrate()?;
    db.set_config("version", env!("CARGO_PKG_VERSION"))?;

    println!("Initialized TaskBuddy database at {}", db_path.display());
    Ok(())
}
