/// Identity provider, auth-state subscriptions and the app session.
pub mod auth;
/// Task board state: lanes, selection, mutations and view projections.
pub mod board;
/// SQLite database: schema, config entries, task documents, session row.
pub mod db;
/// Error enum and `Result` alias shared across the crate.
pub mod error;
/// Data types: Task, Status, Category, drafts, patches, user profile.
pub mod models;
/// The document-store contract plus an in-memory implementation.
pub mod store;
/// Axum-based web server and router.
pub mod web;
