//! HTML views: the landing/sign-in page and the task board page.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use super::AppState;
use super::errors::AppError;
use crate::auth::SignInRequest;
use crate::board::ViewFilter;
use crate::models::{CategoryFilter, DUE_DATE_FORMAT, Status, ViewMode};

const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/150";

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingPage {
    error: String,
}

struct TaskRow {
    id: String,
    title: String,
    due: String,
    category: &'static str,
    status: &'static str,
    selected: bool,
}

struct LaneView {
    key: &'static str,
    label: &'static str,
    count: usize,
    tasks: Vec<TaskRow>,
}

#[derive(Template)]
#[template(path = "board.html")]
struct BoardPage {
    user_name: String,
    avatar_url: String,
    view_mode: &'static str,
    category: &'static str,
    query: String,
    lanes: Vec<LaneView>,
    selected_count: usize,
    load_error: String,
}

/// Query string of the board page.
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    view: Option<String>,
    category: Option<String>,
    q: Option<String>,
}

/// Landing page. Signed-in users go straight to the board.
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    if state.session.current_user().is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }
    let page = LandingPage {
        error: String::new(),
    };
    Ok(Html(page.render().map_err(crate::error::Error::from)?).into_response())
}

pub async fn sign_in(
    State(state): State<AppState>,
    Form(request): Form<SignInRequest>,
) -> Result<Response, AppError> {
    match state.session.sign_in(&request) {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(crate::error::Error::Validation(msg)) => {
            let page = LandingPage { error: msg };
            Ok(Html(page.render().map_err(crate::error::Error::from)?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.session.sign_out()?;
    Ok(Redirect::to("/"))
}

/// Board page. Every render reloads the lanes from the store.
pub async fn board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Response, AppError> {
    let Some(user) = state.session.current_user() else {
        return Ok(Redirect::to("/").into_response());
    };

    let view_mode = match query.view.as_deref() {
        Some(v) => ViewMode::from_str(v)?,
        None => ViewMode::default(),
    };
    let category = CategoryFilter::from_str(query.category.as_deref().unwrap_or("all"))?;
    let search = query.q.unwrap_or_default();
    let filter = ViewFilter::new(category, search.clone());

    let mut board = state.lock_board()?;
    // A failed reload keeps the previous lanes on screen.
    let load_error = match board.load() {
        Ok(()) => String::new(),
        Err(e) => {
            warn!(error = %e, "rendering stale board");
            e.to_string()
        }
    };

    let lanes = Status::ALL
        .into_iter()
        .map(|status| {
            let tasks: Vec<TaskRow> = board
                .visible(status, &filter)
                .into_iter()
                .map(|t| TaskRow {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    due: t.due_date.format(DUE_DATE_FORMAT).to_string(),
                    category: t.category.as_str(),
                    status: t.status.as_str(),
                    selected: board.is_selected(&t.id),
                })
                .collect();
            LaneView {
                key: status.as_str(),
                label: status.label(),
                count: tasks.len(),
                tasks,
            }
        })
        .collect();

    let page = BoardPage {
        user_name: user.display_name,
        avatar_url: user
            .avatar_url
            .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
        view_mode: view_mode.as_str(),
        category: category.as_str(),
        query: search,
        lanes,
        selected_count: board.selected().len(),
        load_error,
    };
    Ok(Html(page.render().map_err(crate::error::Error::from)?).into_response())
}
