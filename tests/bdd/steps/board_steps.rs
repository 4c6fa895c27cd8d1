use cucumber::gherkin::Step;
use cucumber::{given, then, when};

use taskbuddy::board::{TaskBoard, ViewFilter, filter_by_category, search};
use taskbuddy::models::{Category, CategoryFilter, Status, TaskDraft, TaskPatch};
use taskbuddy::store::memory::StoreOp;
use taskbuddy::store::{MemoryStore, TaskStore};

use crate::BoardWorld;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lane(name: &str) -> Status {
    Status::from_str(name).unwrap_or_else(|e| panic!("bad lane {name:?}: {e}"))
}

fn category(name: &str) -> Category {
    Category::from_str(name).unwrap_or_else(|e| panic!("bad category {name:?}: {e}"))
}

/// Split a comma-separated list of titles. An empty string is an empty list.
fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn lane_titles(world: &mut BoardWorld, name: &str) -> Vec<String> {
    world
        .board()
        .lane(lane(name))
        .iter()
        .map(|t| t.title.clone())
        .collect()
}

fn create(world: &mut BoardWorld, title: &str, due: &str, status: &str, cat: &str, alias: &str) {
    let draft = TaskDraft::new(title, due)
        .with_status(lane(status))
        .with_category(category(cat));
    match world.board().create(&draft) {
        Ok(task) => {
            world.task_ids.insert(alias.to_string(), task.id);
            world.last_error = None;
        }
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

fn record<T>(world: &mut BoardWorld, result: taskbuddy::error::Result<T>) {
    world.last_error = result.err().map(|e| e.to_string());
}

fn store_op(name: &str) -> StoreOp {
    match name {
        "list" => StoreOp::List,
        "create" => StoreOp::Create,
        "update" => StoreOp::Update,
        "delete" => StoreOp::Delete,
        other => panic!("unknown store op {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an empty board backed by an in-memory store")]
async fn an_empty_board(world: &mut BoardWorld) {
    world.store = MemoryStore::new();
    world.board = Some(TaskBoard::new(world.store.clone()));
}

/// Seed documents straight into the store, bypassing the board.
/// Each document's title doubles as its alias.
#[given("the store holds these documents:")]
async fn the_store_holds_documents(world: &mut BoardWorld, step: &Step) {
    let table = step.table.as_ref().expect("step needs a table");
    for row in table.rows.iter().skip(1) {
        let (title, status, cat) = (&row[0], &row[1], &row[2]);
        let fields = TaskDraft::new(title.as_str(), "2024-05-01")
            .with_status(lane(status))
            .with_category(category(cat))
            .validate()
            .expect("valid seed document");
        let id = world.store.create_task(&fields).expect("seed document");
        world.task_ids.insert(title.clone(), id);
    }
}

#[given(expr = "a task {string} due {string} in lane {string} with category {string} as {string}")]
async fn a_task_exists(
    world: &mut BoardWorld,
    title: String,
    due: String,
    status: String,
    cat: String,
    alias: String,
) {
    create(world, &title, &due, &status, &cat, &alias);
    assert!(world.last_error.is_none(), "setup create failed: {:?}", world.last_error);
}

#[given(expr = "the store fails every {word} call")]
async fn the_store_fails_op(world: &mut BoardWorld, op: String) {
    world.store.fail_on(store_op(&op));
}

#[given(expr = "the store fails updates and deletes for task {string}")]
async fn the_store_fails_for_task(world: &mut BoardWorld, alias: String) {
    let id = world.task_id(&alias);
    world.store.fail_for_id(&id);
}

#[given(expr = "I remember lane {string}")]
async fn i_remember_lane(world: &mut BoardWorld, name: String) {
    world.snapshot = lane_titles(world, &name);
}

#[given(expr = "I select task {string}")]
async fn i_select_task(world: &mut BoardWorld, alias: String) {
    let id = world.task_id(&alias);
    world.board().select(&id).expect("select task");
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("I load the board")]
async fn i_load_the_board(world: &mut BoardWorld) {
    world.store.clear_calls();
    let result = world.board().load();
    record(world, result);
}

#[when(expr = "I create a task {string} due {string} in lane {string} with category {string} as {string}")]
async fn i_create_a_task(
    world: &mut BoardWorld,
    title: String,
    due: String,
    status: String,
    cat: String,
    alias: String,
) {
    world.store.clear_calls();
    create(world, &title, &due, &status, &cat, &alias);
}

#[when(expr = "I update task {string} to status {string}")]
async fn i_update_status(world: &mut BoardWorld, alias: String, status: String) {
    world.store.clear_calls();
    let id = world.task_id(&alias);
    let result = world.board().update(&id, &TaskPatch::status(lane(&status)));
    record(world, result);
}

#[when(expr = "I update task {string} with title {string}")]
async fn i_update_title(world: &mut BoardWorld, alias: String, title: String) {
    world.store.clear_calls();
    let id = world.task_id(&alias);
    let patch = TaskPatch {
        title: Some(title),
        ..Default::default()
    };
    let result = world.board().update(&id, &patch);
    record(world, result);
}

#[when(expr = "I delete task {string}")]
async fn i_delete_task(world: &mut BoardWorld, alias: String) {
    world.store.clear_calls();
    let id = world.task_id(&alias);
    let result = world.board().delete(&id);
    record(world, result);
}

#[when(expr = "I delete the unknown task id {string}")]
async fn i_delete_unknown(world: &mut BoardWorld, id: String) {
    world.store.clear_calls();
    let result = world.board().delete(&id);
    record(world, result);
}

#[when(expr = "I move task {string} from {string} to {string} at index {int}")]
async fn i_move_task(world: &mut BoardWorld, alias: String, from: String, to: String, index: usize) {
    world.store.clear_calls();
    let id = world.task_id(&alias);
    let result = world.board().move_task(&id, lane(&from), lane(&to), index);
    record(world, result);
}

#[when(expr = "I bulk set the selection to status {string}")]
async fn i_bulk_set_status(world: &mut BoardWorld, status: String) {
    world.store.clear_calls();
    let outcome = world.board().bulk_set_status(lane(&status));
    world.last_outcome = Some(outcome);
}

#[when("I bulk delete the selection")]
async fn i_bulk_delete(world: &mut BoardWorld) {
    world.store.clear_calls();
    let outcome = world.board().bulk_delete();
    world.last_outcome = Some(outcome);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "lane {string} contains exactly {string}")]
async fn lane_contains_exactly(world: &mut BoardWorld, name: String, expected: String) {
    assert_eq!(lane_titles(world, &name), titles(&expected), "lane {name}");
}

#[then(expr = "lane {string} is empty")]
async fn lane_is_empty(world: &mut BoardWorld, name: String) {
    let actual = lane_titles(world, &name);
    assert!(actual.is_empty(), "expected lane {name} to be empty, got {actual:?}");
}

#[then(expr = "lane {string} matches the remembered order")]
async fn lane_matches_snapshot(world: &mut BoardWorld, name: String) {
    let actual = lane_titles(world, &name);
    assert_eq!(actual, world.snapshot);
}

#[then("every task sits in the lane matching its status")]
async fn every_task_in_matching_lane(world: &mut BoardWorld) {
    for (status, task) in world.board().lanes().iter() {
        assert_eq!(status, task.status, "task {} is misfiled", task.title);
    }
}

#[then(expr = "task {string} has a store-assigned id")]
async fn task_has_store_id(world: &mut BoardWorld, alias: String) {
    let id = world.task_id(&alias);
    assert!(!id.is_empty());
    assert!(world.store.document(&id).is_some(), "store has no document {id}");
}

#[then(expr = "task {string} is in lane {string} with due date {string}")]
async fn task_in_lane_with_due(world: &mut BoardWorld, alias: String, name: String, due: String) {
    let id = world.task_id(&alias);
    let task = world
        .board()
        .find(&id)
        .cloned()
        .unwrap_or_else(|| panic!("task {alias} not on the board"));
    assert_eq!(task.status, lane(&name));
    assert_eq!(task.due_date.format("%Y-%m-%d").to_string(), due);
}

#[then(expr = "the store document for {string} has status {string}")]
async fn store_document_status(world: &mut BoardWorld, alias: String, status: String) {
    let id = world.task_id(&alias);
    let doc = world.store.document(&id).expect("document exists");
    assert_eq!(doc.status, lane(&status));
}

#[then(expr = "the store holds {int} document(s)")]
async fn the_store_holds_n(world: &mut BoardWorld, n: usize) {
    assert_eq!(world.store.documents().len(), n);
}

#[then("the last store update carried every field")]
async fn last_update_full(world: &mut BoardWorld) {
    let call = world
        .store
        .calls()
        .into_iter()
        .rev()
        .find(|c| c.op == StoreOp::Update)
        .expect("an update call");
    let patch = call.patch.expect("update carries a patch");
    assert!(
        patch.title.is_some()
            && patch.due_date.is_some()
            && patch.status.is_some()
            && patch.category.is_some(),
        "expected a full field set, got {patch:?}"
    );
}

#[then(expr = "the last store update only set status {string}")]
async fn last_update_status_only(world: &mut BoardWorld, status: String) {
    let call = world
        .store
        .calls()
        .into_iter()
        .rev()
        .find(|c| c.op == StoreOp::Update)
        .expect("an update call");
    assert_eq!(call.patch, Some(TaskPatch::status(lane(&status))));
}

#[then("no store call was made")]
async fn no_store_call(world: &mut BoardWorld) {
    let calls = world.store.calls();
    assert!(calls.is_empty(), "expected no store calls, got {calls:?}");
}

#[then(expr = "the operation failed with {string}")]
async fn the_operation_failed_with(world: &mut BoardWorld, expected: String) {
    let err = world
        .last_error
        .as_deref()
        .expect("expected the last operation to fail");
    assert!(err.contains(&expected), "error {err:?} does not mention {expected:?}");
}

#[then("the operation succeeded")]
async fn the_operation_succeeded(world: &mut BoardWorld) {
    assert!(world.last_error.is_none(), "unexpected error: {:?}", world.last_error);
}

#[then("the selection is empty")]
async fn the_selection_is_empty(world: &mut BoardWorld) {
    assert!(world.board().selected().is_empty());
}

#[then(expr = "the bulk outcome reports {int} success(es) and {int} failure(s)")]
async fn bulk_outcome_counts(world: &mut BoardWorld, ok: usize, failed: usize) {
    let outcome = world.last_outcome.as_ref().expect("a bulk outcome");
    assert_eq!(outcome.succeeded.len(), ok, "successes in {outcome:?}");
    assert_eq!(outcome.failed.len(), failed, "failures in {outcome:?}");
}

#[then(expr = "filtering lane {string} by category {string} yields {string}")]
async fn filtering_yields(world: &mut BoardWorld, name: String, cat: String, expected: String) {
    let filter = CategoryFilter::from_str(&cat).expect("category filter");
    let board = world.board();
    let actual: Vec<String> = filter_by_category(board.lane(lane(&name)), &filter)
        .into_iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(actual, titles(&expected));
}

#[then(expr = "searching lane {string} for {string} yields {string}")]
async fn searching_yields(world: &mut BoardWorld, name: String, query: String, expected: String) {
    let board = world.board();
    let actual: Vec<String> = search(board.lane(lane(&name)), &query)
        .into_iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(actual, titles(&expected));
}

#[then(expr = "lane {string} shows {string} for category {string} and search {string}")]
async fn lane_shows(world: &mut BoardWorld, name: String, expected: String, cat: String, query: String) {
    let filter = ViewFilter::new(CategoryFilter::from_str(&cat).expect("category filter"), query);
    let board = world.board();
    let actual: Vec<String> = board
        .visible(lane(&name), &filter)
        .into_iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(actual, titles(&expected));
}
