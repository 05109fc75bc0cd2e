//! Shared utilities for stocksbot-rs
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-variable helpers.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_opt, env_parse, lookup_opt, lookup_parse, process_env};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
