//! Shared helpers for the integration suite.
//!
//! Builds the full router around scripted upstream backends and provides
//! small request/response helpers on top of `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use corpscope_core::RegistryIndex;
use corpscope_upstream::{
    DisclosureService, NewsItem, ScriptedDisclosure, ScriptedGenerator, ScriptedNews,
};
use corpscope_web::{AppState, build_router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

/// Small registry dataset used by every test.
pub const DATASET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
  <list>
    <corp_code>00126380</corp_code>
    <corp_name>삼성전자(주)</corp_name>
  </list>
  <list>
    <corp_code>00164779</corp_code>
    <corp_name>(주)카카오</corp_name>
  </list>
</result>"#;

/// Handles onto the scripted backends wired into the app state.
pub struct Backends {
    pub disclosure: Arc<ScriptedDisclosure>,
    pub generator: Arc<ScriptedGenerator>,
    pub news: Arc<ScriptedNews>,
}

/// App state backed entirely by scripted providers; no network anywhere.
pub fn scripted_state() -> (AppState, Backends) {
    let disclosure = Arc::new(ScriptedDisclosure::new());
    let generator = Arc::new(ScriptedGenerator::new());
    let news = Arc::new(ScriptedNews::new());

    let state = AppState {
        registry: Arc::new(RegistryIndex::from_xml(DATASET).unwrap()),
        disclosure: DisclosureService::with_provider(disclosure.clone()),
        generator: generator.clone(),
        news: news.clone(),
        index_page: PathBuf::from("nonexistent/index.html"),
        static_dir: PathBuf::from("nonexistent/static"),
    };

    (
        state,
        Backends {
            disclosure,
            generator,
            news,
        },
    )
}

/// Full router over scripted state.
pub fn scripted_app() -> (Router, Backends) {
    let (state, backends) = scripted_state();
    (build_router(state), backends)
}

/// One news item for summary tests.
pub fn news_item(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        description: "요약문...".to_string(),
        link: "https://news.example.com/a".to_string(),
        pub_date: "Mon, 03 Aug 2026 09:00:00 GMT".to_string(),
    }
}

/// Sends a request and returns status plus raw body bytes.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

/// GET returning the parsed JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("non-JSON body for {uri}: {e}"));
    (status, value)
}

/// POST with a JSON body, returning the parsed JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let (status, body) = send(app, request).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("non-JSON body for {uri}: {e}"));
    (status, value)
}
