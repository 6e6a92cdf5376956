//! Engage: HTTP service for job-based social search.
//!
//! Wraps the [`engage_search`] pipeline in an axum server:
//! query → job orchestration → engagement ranking → top-K enhancement.
//!
//! # Architecture
//!
//! - **Config**: environment (and `.env`) parsed into [`ServerConfig`]
//! - **Server**: axum [`router`](server::router) over a shared
//!   [`SearchService`](engage_search::SearchService)
//! - **Tools**: closed [`ToolCall`] dispatch behind `POST /tools`
//! - **Errors**: [`ApiError`] renders `{"error": ...}` with a mapped status

pub mod config;
pub mod error;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{ApiError, Result, ServiceError};
pub use server::{Server, router};
pub use tools::{ToolCall, ToolError};
