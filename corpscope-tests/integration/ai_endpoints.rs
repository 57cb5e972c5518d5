//! `/api/generate-analysis` and `/api/news-summary` contracts: repair
//! protocol, no-AI-on-empty-feed and the summary fallbacks.

use std::sync::Arc;

use axum::http::StatusCode;
use corpscope_upstream::DisabledGenerator;
use corpscope_web::build_router;
use serde_json::json;

use crate::support::{news_item, post_json, scripted_app, scripted_state};

#[tokio::test]
async fn analysis_returns_parsed_model_object() {
    let (app, backends) = scripted_app();
    backends
        .generator
        .push_text(r#"{"vision": "글로벌 확장", "swot": {"strength": ["브랜드"]}}"#);

    let (status, body) = post_json(
        app,
        "/api/generate-analysis",
        json!({"name": "삼성전자", "bizArea": "반도체"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vision"], "글로벌 확장");
    assert_eq!(body["swot"]["strength"][0], "브랜드");
    assert_eq!(backends.generator.call_count(), 1);
}

#[tokio::test]
async fn analysis_repairs_unparseable_first_reply() {
    let (app, backends) = scripted_app();
    backends.generator.push_text(r#"{"vision": 깨진"#);
    backends.generator.push_text(r#"{"vision": "복구된 비전"}"#);

    let (status, body) = post_json(
        app,
        "/api/generate-analysis",
        json!({"name": "카카오", "bizArea": "플랫폼"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vision"], "복구된 비전");
    // Exactly one repair round
    assert_eq!(backends.generator.call_count(), 2);
}

#[tokio::test]
async fn analysis_fails_after_unrepairable_output() {
    let (app, backends) = scripted_app();
    backends.generator.push_text("prose without any object");
    backends.generator.push_text("still prose");

    let (status, body) = post_json(
        app,
        "/api/generate-analysis",
        json!({"name": "카카오", "bizArea": "플랫폼"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(backends.generator.call_count(), 2);
}

#[tokio::test]
async fn analysis_without_credentials_answers_500() {
    let (mut state, _backends) = scripted_state();
    state.generator = Arc::new(DisabledGenerator);
    let app = build_router(state);

    let (status, body) = post_json(
        app,
        "/api/generate-analysis",
        json!({"name": "삼성전자", "bizArea": "반도체"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn empty_feed_skips_the_model_entirely() {
    let (app, backends) = scripted_app();
    // No news items scripted; the generator must never be consulted

    let (status, body) = post_json(app, "/api/news-summary", json!({"keyword": "없는회사"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news_list"], json!([]));
    assert!(
        body["ai_summary"]
            .as_str()
            .unwrap()
            .contains("'없는회사'에 대한 뉴스 검색 결과가 없습니다")
    );
    assert_eq!(backends.generator.call_count(), 0);
}

#[tokio::test]
async fn summary_uses_the_summary_key_of_the_reply() {
    let (app, backends) = scripted_app();
    backends.news.set_items(vec![
        news_item("삼성전자 실적 발표"),
        news_item("반도체 수출 호조"),
    ]);
    backends
        .generator
        .push_text(r#"{"summary": "<ul><li>실적 개선</li></ul>"}"#);

    let (status, body) = post_json(app, "/api/news-summary", json!({"keyword": "삼성전자"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_summary"], "<ul><li>실적 개선</li></ul>");
    assert_eq!(body["news_list"].as_array().unwrap().len(), 2);
    assert_eq!(body["news_list"][0]["title"], "삼성전자 실적 발표");
    assert_eq!(body["news_list"][0]["pubDate"], "Mon, 03 Aug 2026 09:00:00 GMT");
    assert_eq!(backends.generator.call_count(), 1);
}

#[tokio::test]
async fn unparseable_summary_reply_is_passed_through_raw() {
    let (app, backends) = scripted_app();
    backends.news.set_items(vec![news_item("기사 하나")]);
    backends.generator.push_text("그냥 평문 요약");

    let (status, body) = post_json(app, "/api/news-summary", json!({"keyword": "카카오"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_summary"], "그냥 평문 요약");
}

#[tokio::test]
async fn summary_failure_degrades_to_fallback_marker() {
    let (mut state, backends) = scripted_state();
    state.generator = Arc::new(DisabledGenerator);
    backends.news.set_items(vec![news_item("기사 하나")]);
    let app = build_router(state);

    let (status, body) = post_json(app, "/api/news-summary", json!({"keyword": "카카오"})).await;

    // The request still succeeds; only the summary degrades
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_summary"], "요약 실패");
    assert_eq!(body["news_list"].as_array().unwrap().len(), 1);
}
