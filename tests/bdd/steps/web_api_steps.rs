#![allow(deprecated)]
use cucumber::{given, then, when};
use reqwest::Method;
use serde_json::{Value, json};

use crate::BoardWorld;
use crate::steps::web_steps::{http_get, record_response, server_url};

// ---------------------------------------------------------------------------
// HTTP helper functions
// ---------------------------------------------------------------------------

/// Send `method` to the test server with an optional JSON body.
async fn http_send(
    world: &mut BoardWorld,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (u16, String) {
    let url = server_url(world, path);
    let mut request = world.http_client.request(method.clone(), &url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let resp = request
        .send()
        .await
        .unwrap_or_else(|e| panic!("{method} {url} failed: {e}"));
    record_response(world, resp).await
}

pub async fn http_post(world: &mut BoardWorld, path: &str, body: Value) -> (u16, String) {
    http_send(world, Method::POST, path, Some(body)).await
}

pub async fn http_patch(world: &mut BoardWorld, path: &str, body: Value) -> (u16, String) {
    http_send(world, Method::PATCH, path, Some(body)).await
}

pub async fn http_put(world: &mut BoardWorld, path: &str, body: Value) -> (u16, String) {
    http_send(world, Method::PUT, path, Some(body)).await
}

pub async fn http_delete(world: &mut BoardWorld, path: &str) -> (u16, String) {
    http_send(world, Method::DELETE, path, None).await
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_body(body: &str) -> Value {
    serde_json::from_str(body)
        .unwrap_or_else(|e| panic!("response body is not valid JSON: {e}\nbody: {body}"))
}

fn parse_last_response(world: &BoardWorld) -> Value {
    parse_body(
        world
            .last_response_body
            .as_deref()
            .expect("no HTTP response body recorded"),
    )
}

fn parse_raw_body(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| panic!("step body is not valid JSON: {e}\n{raw}"))
}

/// Walk a dotted path such as `succeeded.0` through a JSON value.
fn lookup<'a>(json: &'a Value, path: &str) -> &'a Value {
    path.split('.').fold(json, |value, key| match key.parse::<usize>() {
        Ok(i) => &value[i],
        Err(_) => &value[key],
    })
}

fn titles(lane: &Value) -> Vec<String> {
    lane.as_array()
        .map(|tasks| {
            tasks
                .iter()
                .map(|t| t["title"].as_str().unwrap_or("").to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn split_titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given(expr = "I signed in via API as {string} with email {string}")]
async fn i_signed_in_via_api(world: &mut BoardWorld, name: String, email: String) {
    let (status, body) = http_post(world, "/api/session", json!({"name": name, "email": email})).await;
    assert_eq!(status, 200, "expected 200 from POST /api/session but got {status}: {body}");
}

#[given(expr = "I created a task via API {string} due {string} in lane {string} as {string}")]
async fn i_created_a_task_via_api(
    world: &mut BoardWorld,
    title: String,
    due: String,
    lane: String,
    alias: String,
) {
    let (status, body) = http_post(
        world,
        "/api/tasks",
        json!({"title": title, "dueDate": due, "status": lane}),
    )
    .await;
    assert_eq!(status, 201, "expected 201 from POST /api/tasks but got {status}: {body}");
    let id = parse_body(&body)["id"]
        .as_str()
        .unwrap_or_else(|| panic!("POST /api/tasks response has no 'id' field: {body}"))
        .to_string();
    world.task_ids.insert(alias, id);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when(expr = "I POST {string} with body {string}")]
async fn i_post_path_with_body(world: &mut BoardWorld, path: String, raw_body: String) {
    http_post(world, &path, parse_raw_body(&raw_body)).await;
}

#[when(expr = "I DELETE {string}")]
async fn i_delete_path(world: &mut BoardWorld, path: String) {
    http_delete(world, &path).await;
}

#[when(expr = "I GET the API task {string}")]
async fn i_get_the_api_task(world: &mut BoardWorld, alias: String) {
    let id = world.task_id(&alias);
    http_get(world, &format!("/api/tasks/{id}")).await;
}

#[when(expr = "I PATCH the API task {string} with body {string}")]
async fn i_patch_the_api_task(world: &mut BoardWorld, alias: String, raw_body: String) {
    let id = world.task_id(&alias);
    http_patch(world, &format!("/api/tasks/{id}"), parse_raw_body(&raw_body)).await;
}

#[when(expr = "I DELETE the API task {string}")]
async fn i_delete_the_api_task(world: &mut BoardWorld, alias: String) {
    let id = world.task_id(&alias);
    http_delete(world, &format!("/api/tasks/{id}")).await;
}

#[when(expr = "I move the API task {string} with body {string}")]
async fn i_move_the_api_task(world: &mut BoardWorld, alias: String, raw_body: String) {
    let id = world.task_id(&alias);
    http_post(world, &format!("/api/tasks/{id}/move"), parse_raw_body(&raw_body)).await;
}

/// Replace the selection with the comma-separated task aliases.
#[when(expr = "I select the API tasks {string}")]
async fn i_select_the_api_tasks(world: &mut BoardWorld, aliases: String) {
    let ids: Vec<String> = split_titles(&aliases)
        .iter()
        .map(|alias| world.task_id(alias))
        .collect();
    http_put(world, "/api/selection", json!({ "ids": ids })).await;
}

#[when(expr = "I select the unknown API task {string}")]
async fn i_select_an_unknown_api_task(world: &mut BoardWorld, id: String) {
    http_put(world, "/api/selection", json!({ "ids": [id] })).await;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "the response JSON has field {string}")]
async fn the_response_json_has_field(world: &mut BoardWorld, field: String) {
    let json = parse_last_response(world);
    assert!(
        !lookup(&json, &field).is_null(),
        "expected field {field:?} in response JSON, got: {json}"
    );
}

#[then(expr = "the response JSON field {string} equals {string}")]
async fn the_response_json_field_equals_string(
    world: &mut BoardWorld,
    field: String,
    expected: String,
) {
    // `<alias>` stands for the id of a task created earlier.
    let expected = match expected.strip_prefix('<').and_then(|a| a.strip_suffix('>')) {
        Some(alias) => world.task_id(alias),
        None => expected,
    };
    let json = parse_last_response(world);
    let actual = lookup(&json, &field);
    assert_eq!(
        actual.as_str(),
        Some(expected.as_str()),
        "field {field:?}: expected {expected:?}, got {actual} in {json}"
    );
}

#[then(expr = "the response JSON array {string} has length {int}")]
async fn the_response_json_array_has_length(world: &mut BoardWorld, field: String, expected: usize) {
    let json = parse_last_response(world);
    let len = lookup(&json, &field)
        .as_array()
        .map(Vec::len)
        .unwrap_or_else(|| panic!("field {field:?} is not an array in {json}"));
    assert_eq!(len, expected, "length of {field:?} in {json}");
}

/// Fetch `/api/tasks` and compare a lane's titles in order.
#[then(expr = "the API lane {string} lists {string}")]
async fn the_api_lane_lists(world: &mut BoardWorld, lane: String, expected: String) {
    let (status, body) = http_get(world, "/api/tasks").await;
    assert_eq!(status, 200, "GET /api/tasks failed with {status}: {body}");
    let json = parse_body(&body);
    assert_eq!(titles(&json[&lane]), split_titles(&expected), "lane {lane} in {json}");
}

#[then(expr = "the API selection is empty")]
async fn the_api_selection_is_empty(world: &mut BoardWorld) {
    let (status, body) = http_get(world, "/api/selection").await;
    assert_eq!(status, 200, "GET /api/selection failed with {status}: {body}");
    let json = parse_body(&body);
    assert_eq!(json["ids"], json!([]), "selection in {json}");
}
