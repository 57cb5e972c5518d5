//! `/api/search` contract: validation, miss and hit envelopes.

use axum::http::StatusCode;

use crate::support::{get_json, scripted_app};

#[tokio::test]
async fn empty_name_is_rejected_with_400() {
    let (app, _) = scripted_app();

    let (status, body) = get_json(app, "/api/search?name=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "400");
    assert_eq!(body["message"], "기업명을 입력하세요.");
}

#[tokio::test]
async fn missing_name_parameter_is_rejected_with_400() {
    let (app, _) = scripted_app();

    let (status, body) = get_json(app, "/api/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "400");
}

#[tokio::test]
async fn unknown_name_answers_404() {
    let (app, _) = scripted_app();
    let uri = format!("/api/search?name={}", urlencoding::encode("없는회사"));

    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "404");
    assert_eq!(body["message"], "일치하는 기업을 찾을 수 없습니다.");
}

#[tokio::test]
async fn known_name_returns_code_and_original_name() {
    let (app, _) = scripted_app();
    let uri = format!("/api/search?name={}", urlencoding::encode("삼성전자"));

    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "000");
    assert_eq!(body["corp_code"], "00126380");
    // The original dataset name is returned, not the normalized key
    assert_eq!(body["corp_name"], "삼성전자(주)");
}

#[tokio::test]
async fn suffix_marker_in_query_is_ignored() {
    let (app, _) = scripted_app();
    let uri = format!("/api/search?name={}", urlencoding::encode(" (주)카카오 "));

    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corp_code"], "00164779");
    assert_eq!(body["corp_name"], "(주)카카오");
}
