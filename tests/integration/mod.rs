//! Integration tests over the HTTP surface

mod auth_flow_tests;
mod grading_tests;
mod scoping_tests;
