mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tb", version, about = "Three-lane task board")]
struct Cli {
    /// Path to the database file (default: .taskbuddy/taskbuddy.db in current dir)
    #[arg(long, env = "TASKBUDDY_DB")]
    db: Option<PathBuf>,

    /// Output as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize TaskBuddy in the current directory
    Init,
    /// Sign in
    Login {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Avatar image URL
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Sign out and clear the stored profile
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create a task
    Add {
        /// Task title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,
        /// Lane (todo, inProgress, completed)
        #[arg(short, long, default_value = "todo")]
        status: String,
        /// Category (work, personal)
        #[arg(short, long, default_value = "work")]
        category: String,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// New lane (todo, inProgress, completed)
        #[arg(short, long)]
        status: Option<String>,
        /// New category (work, personal)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },
    /// Move a task to the end of another lane
    Mv {
        /// Task ID
        id: String,
        /// Destination lane (todo, inProgress, completed)
        lane: String,
    },
    /// Show the board
    List {
        /// Layout: list or board
        #[arg(long, default_value = "list")]
        view: String,
        /// Category filter (all, work, personal)
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Only tasks whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Apply an action to several tasks at once
    Bulk {
        #[command(subcommand)]
        action: BulkAction,
    },
    /// Serve the web UI and JSON API
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand)]
enum BulkAction {
    /// Move every given task to a lane
    Status {
        /// Destination lane
        lane: String,
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every given task
    Rm {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn install_tracing(default_level: tracing::Level) {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let level = if matches!(cli.command, Commands::Serve { .. }) {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    install_tracing(level);

    let db_path = match cli.db {
        Some(p) => p,
        None => match std::env::current_dir() {
            Ok(mut p) => {
                p.push(".taskbuddy");
                p.push("taskbuddy.db");
                p
            }
            Err(e) => {
                eprintln!("error: cannot determine current directory: {e}");
                std::process::exit(1);
            }
        },
    };

    let result = match cli.command {
        Commands::Init => commands::init::run(&db_path),
        Commands::Login {
            name,
            email,
            avatar,
        } => commands::auth::login(&db_path, &name, &email, avatar.as_deref(), cli.json),
        Commands::Logout => commands::auth::logout(&db_path),
        Commands::Whoami => commands::auth::whoami(&db_path, cli.json),
        Commands::Add {
            title,
            due,
            status,
            category,
        } => commands::add::run(&db_path, &title, &due, &status, &category, cli.json),
        Commands::Edit {
            id,
            title,
            due,
            status,
            category,
        } => commands::edit::run(
            &db_path,
            &id,
            title.as_deref(),
            due.as_deref(),
            status.as_deref(),
            category.as_deref(),
            cli.json,
        ),
        Commands::Rm { id } => commands::remove::run(&db_path, &id),
        Commands::Mv { id, lane } => commands::mv::run(&db_path, &id, &lane, cli.json),
        Commands::List {
            view,
            category,
            search,
        } => commands::list::run(&db_path, &view, &category, search.as_deref(), cli.json),
        Commands::Bulk { action } => match action {
            BulkAction::Status { lane, ids } => {
                commands::bulk::status(&db_path, &lane, &ids, cli.json)
            }
            BulkAction::Rm { ids } => commands::bulk::delete(&db_path, &ids, cli.json),
        },
        Commands::Serve { port } => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(taskbuddy::web::serve(&db_path, port)),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
