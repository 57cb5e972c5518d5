//! Front-end page serving and the JSON fallbacks for unmatched routes.

use std::io::Write;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use corpscope_web::build_router;

use crate::support::{get_json, scripted_app, scripted_state, send};

#[tokio::test]
async fn home_serves_the_front_end_page() {
    let (mut state, _backends) = scripted_state();

    let mut page = tempfile::NamedTempFile::new().unwrap();
    page.write_all("<html><body>기업 탐색</body></html>".as_bytes())
        .unwrap();
    state.index_page = page.path().to_path_buf();
    let app = build_router(state);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("기업 탐색"));
}

#[tokio::test]
async fn home_with_missing_page_answers_inline_hint() {
    let (app, _) = scripted_app();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    // Kept reachable instead of failing; the hint replaces the page
    assert_eq!(status, StatusCode::OK);
    assert!(
        String::from_utf8(body)
            .unwrap()
            .contains("index.html 파일을 찾을 수 없습니다")
    );
}

#[tokio::test]
async fn unmatched_route_answers_json_404() {
    let (app, _) = scripted_app();

    let (status, body) = get_json(app, "/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "404 Not Found");
    assert_eq!(body["message"], "요청하신 API 경로가 잘못되었습니다.");
}

#[tokio::test]
async fn unmatched_method_answers_json_404() {
    let (app, _) = scripted_app();

    let request = Request::builder()
        .method("DELETE")
        .uri("/nowhere")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"], "404 Not Found");
}
