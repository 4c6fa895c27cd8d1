//! JSON API over the shared task board.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::errors::AppError;
use crate::auth::SignInRequest;
use crate::board::{BulkOutcome, ViewFilter};
use crate::models::{CategoryFilter, Status, Task, TaskDraft, TaskPatch, UserProfile};

#[derive(Debug, Default, Deserialize)]
pub struct LanesQuery {
    category: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Lane the task is dragged from. Defaults to the lane currently holding it.
    from: Option<Status>,
    to: Status,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    status: Status,
}

fn require_user(state: &AppState) -> Result<UserProfile, AppError> {
    Ok(state.session.require_user()?)
}

// -- Session --

pub async fn get_session(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    require_user(&state).map(Json)
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.session.sign_in(&request)?))
}

pub async fn delete_session(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.sign_out()?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Tasks --

/// All three lanes after the category filter and search, plus the selection.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<LanesQuery>,
) -> Result<Json<Value>, AppError> {
    require_user(&state)?;
    let category = CategoryFilter::from_str(query.category.as_deref().unwrap_or("all"))?;
    let filter = ViewFilter::new(category, query.q.unwrap_or_default());

    let board = state.lock_board()?;
    Ok(Json(json!({
        "todo": board.visible(Status::Todo, &filter),
        "inProgress": board.visible(Status::InProgress, &filter),
        "completed": board.visible(Status::Completed, &filter),
        "selected": board.selected(),
    })))
}

pub async fn reload_tasks(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    require_user(&state)?;
    let mut board = state.lock_board()?;
    board.load()?;
    Ok(Json(json!({ "count": board.len() })))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    require_user(&state)?;
    let task = state.lock_board()?.create(&draft)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    require_user(&state)?;
    let board = state.lock_board()?;
    board
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("task not found: {id}")))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    require_user(&state)?;
    if patch.is_empty() {
        return Err(AppError::Validation("no fields to update".to_string()));
    }
    let task = state.lock_board()?.update(&id, &patch)?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_user(&state)?;
    state.lock_board()?.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Task>, AppError> {
    require_user(&state)?;
    let mut board = state.lock_board()?;
    match request.from {
        Some(from) => board.move_task(&id, from, request.to, request.index)?,
        None => board.move_to(&id, request.to, request.index)?,
    }
    board
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::Internal(format!("task {id} lost during move")))
}

// -- Selection --

pub async fn get_selection(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    require_user(&state)?;
    let board = state.lock_board()?;
    Ok(Json(json!({ "ids": board.selected() })))
}

/// Replace the selection. Unknown ids reject the whole request.
pub async fn put_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<Value>, AppError> {
    require_user(&state)?;
    let mut board = state.lock_board()?;
    if let Some(missing) = request.ids.iter().find(|id| board.find(id).is_none()) {
        return Err(AppError::NotFound(format!("task not found: {missing}")));
    }
    board.clear_selection();
    for id in &request.ids {
        board.select(id)?;
    }
    Ok(Json(json!({ "ids": board.selected() })))
}

pub async fn clear_selection(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    require_user(&state)?;
    state.lock_board()?.clear_selection();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    require_user(&state)?;
    Ok(Json(state.lock_board()?.bulk_set_status(request.status)))
}

pub async fn bulk_delete(State(state): State<AppState>) -> Result<Json<BulkOutcome>, AppError> {
    require_user(&state)?;
    Ok(Json(state.lock_board()?.bulk_delete()))
}
