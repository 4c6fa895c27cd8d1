use crate::auth::{LocalIdentity, Session};
use crate::board::TaskBoard;
use crate::db::Database;
use crate::error::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod api;
mod errors;
mod handlers;

pub use errors::AppError;

/// Shared application state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<Mutex<TaskBoard<Database>>>,
    pub session: Arc<Session<LocalIdentity>>,
}

impl AppState {
    /// Open the board, identity and local-profile connections on one database
    /// file and load the board once.
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        db.migrate()?;
        let mut board = TaskBoard::new(db);
        if let Err(e) = board.load() {
            error!(error = %e, "initial board load failed; starting empty");
        }
        let identity = LocalIdentity::new(Database::open(db_path)?);
        let session = Session::new(identity, Database::open(db_path)?);
        Ok(AppState {
            board: Arc::new(Mutex::new(board)),
            session: Arc::new(session),
        })
    }

    pub(crate) fn lock_board(&self) -> std::result::Result<MutexGuard<'_, TaskBoard<Database>>, AppError> {
        self.board
            .lock()
            .map_err(|_| AppError::Internal("board lock poisoned".to_string()))
    }
}

/// Build the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/signin", post(handlers::sign_in))
        .route("/signout", post(handlers::sign_out))
        .route("/tasks", get(handlers::board))
        .route(
            "/api/session",
            get(api::get_session)
                .post(api::create_session)
                .delete(api::delete_session),
        )
        .route("/api/tasks", get(api::list_tasks).post(api::create_task))
        .route("/api/tasks/reload", post(api::reload_tasks))
        .route(
            "/api/tasks/{id}",
            get(api::get_task)
                .patch(api::update_task)
                .delete(api::delete_task),
        )
        .route("/api/tasks/{id}/move", post(api::move_task))
        .route(
            "/api/selection",
            get(api::get_selection)
                .put(api::put_selection)
                .delete(api::clear_selection),
        )
        .route("/api/selection/status", post(api::bulk_status))
        .route("/api/selection/delete", post(api::bulk_delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server on the given port.
pub async fn serve(db_path: &Path, port: u16) -> Result<()> {
    let state = AppState::open(db_path)?;

    // The server is the view: it stays subscribed to auth changes while it runs.
    let _auth_subscription = state.session.activate(|user| match user {
        Some(user) => info!(name = %user.display_name, "auth state: signed in"),
        None => info!("auth state: signed out"),
    });

    let app = create_router(state);
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("TaskBuddy web UI: http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;
    Ok(())
}
