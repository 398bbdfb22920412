//! archsim: microservice architecture descriptors and dependency graphs
//!
//! Layers:
//! - `domain`: descriptor model, field validation, graph aggregation (no I/O)
//! - `application`: edit-script sessions and graph services
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
