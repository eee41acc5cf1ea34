//! Test suite for academix
//!
//! - `common/` — shared infrastructure: in-memory SQLite app state, fixtures
//! - `integration/` — end-to-end tests driving the HTTP surface through
//!   `actix_web::test`
//!
//! Run with `cargo test --test lib`.

pub mod common;
pub mod integration;
