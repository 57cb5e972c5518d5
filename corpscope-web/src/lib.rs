//! Corpscope Web - JSON API Server
//!
//! Pure JSON API server combining the company registry, the disclosure API,
//! the generative-AI client and the news fetcher behind a small set of
//! endpoints, plus the static front-end page.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
