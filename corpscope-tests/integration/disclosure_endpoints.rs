//! `/api/company` and `/api/finance` contracts, including the
//! consolidated-to-standalone statement fallback.

use axum::http::StatusCode;
use corpscope_upstream::UpstreamError;
use serde_json::json;

use crate::support::{get_json, scripted_app};

#[tokio::test]
async fn company_payload_is_passed_through() {
    let (app, backends) = scripted_app();
    backends.disclosure.push_response(json!({
        "status": "000",
        "corp_name": "삼성전자(주)",
        "ceo_nm": "아무개"
    }));

    let (status, body) = get_json(app, "/api/company?code=00126380").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corp_name"], "삼성전자(주)");

    let calls = backends.disclosure.recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "company.json");
    assert!(
        calls[0]
            .1
            .contains(&("corp_code".to_string(), "00126380".to_string()))
    );
}

#[tokio::test]
async fn company_upstream_failure_maps_to_500_envelope() {
    let (app, backends) = scripted_app();
    backends.disclosure.push_error(UpstreamError::UpstreamStatus {
        status: 502,
        body: "bad gateway".to_string(),
    });

    let (status, body) = get_json(app, "/api/company?code=1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "500");
    assert!(body["message"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn finance_prefers_consolidated_statement() {
    let (app, backends) = scripted_app();
    backends.disclosure.push_response(json!({
        "status": "000",
        "message": "정상",
        "list": [{"account_nm": "자산총계", "fs_div": "CFS"}]
    }));

    let (status, body) = get_json(app, "/api/finance?code=00126380&year=2023").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list"][0]["fs_div"], "CFS");
    assert_eq!(backends.disclosure.call_count(), 1);
}

#[tokio::test]
async fn finance_falls_back_to_standalone_statement() {
    let (app, backends) = scripted_app();
    backends
        .disclosure
        .push_response(json!({"status": "013", "message": "조회된 데이타가 없습니다."}));
    backends.disclosure.push_response(json!({
        "status": "000",
        "message": "정상",
        "list": [{"account_nm": "자산총계", "fs_div": "OFS"}]
    }));

    let (status, body) = get_json(app, "/api/finance?code=00126380&year=2023").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list"][0]["fs_div"], "OFS");

    let calls = backends.disclosure.recorded_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].1.contains(&("fs_div".to_string(), "CFS".to_string())));
    assert!(calls[1].1.contains(&("fs_div".to_string(), "OFS".to_string())));
}

#[tokio::test]
async fn finance_upstream_failure_maps_to_500_envelope() {
    let (app, backends) = scripted_app();
    backends.disclosure.push_error(UpstreamError::RequestFailed {
        reason: "connection refused".to_string(),
    });

    let (status, body) = get_json(app, "/api/finance?code=1&year=2023").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "500");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("connection refused")
    );
}
