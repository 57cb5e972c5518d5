//! Front-end page handler.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use tracing::warn;

use crate::server::AppState;

/// `GET /` - serves the static front-end page.
///
/// A missing page file answers with an inline HTML hint instead of an
/// error status, so the route stays reachable while assets are absent.
pub async fn home_page(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(&state.index_page).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            warn!("front-end page {} unavailable: {e}", state.index_page.display());
            Html(format!(
                "<h3>index.html 파일을 찾을 수 없습니다.</h3>\
                 <p>정적 파일 경로를 확인해주세요.<br>에러: {e}</p>"
            ))
            .into_response()
        }
    }
}
