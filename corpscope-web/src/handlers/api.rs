//! API handlers for company search, disclosure data and AI features.
//!
//! Each handler shapes its own success and error envelope; the literal
//! status strings and Korean messages are part of the wire contract with
//! the front-end page.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use corpscope_core::BraceSpanExtractor;
use corpscope_upstream::{NewsItem, TextGenerator, UpstreamError, generate_json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::server::AppState;

/// Fallback summary shown when the AI summary cannot be produced.
const SUMMARY_FALLBACK: &str = "요약 실패";

/// JSON schema template embedded in the analysis prompt; the model is asked
/// to fill exactly this shape.
const ANALYSIS_SCHEMA: &str = r#"{"vision": "비전(한글)", "productsAndServices": ["제품1"], "performanceSummary": "실적요약(한글)", "swot": {"strength": [], "weakness": [], "opportunity": [], "threat": [], "strategy": ""}, "industryAnalysis": {"method": "", "result": "", "competitors": "", "competitorAnalysis": ""}, "job": {"duties": "", "description": "", "knowledge": "", "skills": "", "attitude": "", "certs": "", "env": "", "careerDev": ""}, "selfAnalysis": {"knowledge": "", "skills": "", "attitude": "", "actionPlan1": "", "actionPlan2": "", "actionPlan3": ""}}"#;

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Company name to resolve
    #[serde(default)]
    pub name: String,
}

/// Query parameters for `/api/company`.
#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    /// Registry code of the company
    #[serde(default)]
    pub code: String,
}

/// Query parameters for `/api/finance`.
#[derive(Debug, Deserialize)]
pub struct FinanceQuery {
    /// Registry code of the company
    #[serde(default)]
    pub code: String,
    /// Business year, e.g. `2023`
    #[serde(default)]
    pub year: String,
}

/// Body of `/api/generate-analysis`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// Company name
    #[serde(default)]
    pub name: String,
    /// Business area description
    #[serde(default, rename = "bizArea")]
    pub biz_area: String,
}

/// Body of `/api/news-summary`.
#[derive(Debug, Deserialize)]
pub struct NewsSummaryRequest {
    /// Search keyword, usually a company name
    #[serde(default)]
    pub keyword: String,
}

/// `GET /api/search` - resolve a company name to its registry code.
pub async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let name = params.name.trim();

    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "400", "message": "기업명을 입력하세요."})),
        )
            .into_response();
    }

    match state.registry.lookup(name) {
        Some(entry) => Json(json!({
            "status": "000",
            "corp_code": entry.code,
            "corp_name": entry.original_name,
        }))
        .into_response(),
        None => {
            warn!("company search miss for {name:?}");
            (
                StatusCode::NOT_FOUND,
                Json(json!({"status": "404", "message": "일치하는 기업을 찾을 수 없습니다."})),
            )
                .into_response()
        }
    }
}

/// `GET /api/company` - pass through the company profile.
pub async fn api_company(
    State(state): State<AppState>,
    Query(params): Query<CompanyQuery>,
) -> Response {
    match state.disclosure.company(&params.code).await {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            error!("company fetch for code {:?} failed: {e}", params.code);
            upstream_failure(e)
        }
    }
}

/// `GET /api/finance` - annual statements, consolidated preferred.
pub async fn api_finance(
    State(state): State<AppState>,
    Query(params): Query<FinanceQuery>,
) -> Response {
    match state
        .disclosure
        .financial_statements(&params.code, &params.year)
        .await
    {
        Ok(data) => Json(data).into_response(),
        Err(e) => {
            error!(
                "finance fetch for code {:?} year {:?} failed: {e}",
                params.code, params.year
            );
            upstream_failure(e)
        }
    }
}

/// `POST /api/generate-analysis` - AI company analysis in a fixed schema.
pub async fn api_generate_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Response {
    let prompt = format!(
        "기업 '{}({})'을 프론트엔드 개발자 취업 준비생 관점에서 분석해줘. 아래 JSON 포맷만 리턴해.\n{ANALYSIS_SCHEMA}",
        req.name, req.biz_area
    );

    match generate_json(state.generator.as_ref(), &BraceSpanExtractor, &prompt).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(UpstreamError::UpstreamStatus { status, body }) => {
            error!("analysis generation for {:?} failed: HTTP {status}", req.name);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Gemini Error", "details": body})),
            )
                .into_response()
        }
        Err(e) => {
            error!("analysis generation for {:?} failed: {e}", req.name);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// `POST /api/news-summary` - top news items plus an AI summary.
///
/// Always answers 200. With no feed items the response carries a canned
/// no-results message and the AI backend is not invoked at all; a failed
/// summary degrades to the raw model text or the fallback marker.
pub async fn api_news_summary(
    State(state): State<AppState>,
    Json(req): Json<NewsSummaryRequest>,
) -> Json<Value> {
    let keyword = req.keyword;
    info!("news summary requested for {keyword:?}");

    let items = state.news.fetch(&keyword).await;

    if items.is_empty() {
        return Json(json!({
            "news_list": [],
            "ai_summary": format!(
                "<b>'{keyword}'에 대한 뉴스 검색 결과가 없습니다.</b><br>검색어를 확인하거나, 기업명을 정확히 입력해주세요."
            ),
        }));
    }

    let summary = summarize_titles(state.generator.as_ref(), &keyword, &items).await;

    Json(json!({"news_list": items, "ai_summary": summary}))
}

/// Summarizes the item titles through the AI backend.
///
/// The reply is expected to be a `{"summary": ...}` object; the `summary`
/// value is preferred, any first value is accepted, unparseable replies are
/// passed through raw and every error path yields the fallback marker.
async fn summarize_titles(
    generator: &dyn TextGenerator,
    keyword: &str,
    items: &[NewsItem],
) -> Value {
    let titles = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.title))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "다음 '{keyword}' 관련 뉴스 제목들을 보고 취업 면접 대비용으로 3줄 핵심 요약해줘.\n\
         형식: <ul><li>핵심1</li><li>핵심2</li><li>핵심3</li></ul>\n\
         반환값은 반드시 다음 JSON 포맷이어야 해: {{\"summary\": \"HTML문자열\"}}\n\
         뉴스 목록:\n{titles}"
    );

    match generator.generate(&prompt).await {
        Ok(reply) => {
            let raw = reply.collect_text();
            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map
                    .get("summary")
                    .cloned()
                    .or_else(|| map.values().next().cloned())
                    .unwrap_or_else(|| Value::String(SUMMARY_FALLBACK.to_string())),
                Ok(_) => Value::String(SUMMARY_FALLBACK.to_string()),
                // Keep the raw text, it may still be useful to the reader
                Err(_) => Value::String(raw),
            }
        }
        Err(e) => {
            error!("news summary generation for {keyword:?} failed: {e}");
            Value::String(SUMMARY_FALLBACK.to_string())
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "404 Not Found",
            "message": "요청하신 API 경로가 잘못되었습니다."
        })),
    )
        .into_response()
}

/// Maps an upstream error into the disclosure-style 500 envelope.
fn upstream_failure(e: UpstreamError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "500", "message": e.to_string()})),
    )
        .into_response()
}
