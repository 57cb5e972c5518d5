//! Integration tests for Corpscope
//!
//! Drive the full axum router with scripted upstream backends and verify
//! the endpoint contracts: envelopes, status codes, fallback behavior and
//! upstream call sequencing.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/search_endpoints.rs"]
mod search_endpoints;

#[path = "integration/disclosure_endpoints.rs"]
mod disclosure_endpoints;

#[path = "integration/ai_endpoints.rs"]
mod ai_endpoints;

#[path = "integration/pages_and_fallback.rs"]
mod pages_and_fallback;
