//! Academic-institution management backend
//!
//! REST API over a relational store: users and roles, students and teachers,
//! academic structure (filières, promotions, modules), grading (notes,
//! bulletins), attendance (séances, présences), timetables and file
//! resources, protected end to end by JWT-based role authorization.

pub mod auth;
pub mod config;
pub mod domain;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use utils::error::{ApiError, Result};
