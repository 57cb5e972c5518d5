//! Financial-disclosure API client.
//!
//! Wraps the key-authenticated disclosure REST API behind the
//! [`DisclosureProvider`] trait and layers the consolidated/standalone
//! statement fallback on top in [`DisclosureService`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use corpscope_core::config::DisclosureConfig;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::errors::UpstreamError;
use crate::transport::HttpTransport;

/// Annual-report report code used for all statement requests.
const REPORT_CODE: &str = "11014";
/// Full single-company statement endpoint.
const STATEMENTS_PATH: &str = "fnlttSinglAcntAll.json";
/// Company profile endpoint.
const COMPANY_PATH: &str = "company.json";

/// Trait for disclosure API backends.
///
/// Implementations fetch one endpoint with query parameters and return the
/// upstream JSON verbatim (real API, disabled null-object, scripted data
/// for tests).
#[async_trait]
pub trait DisclosureProvider: Send + Sync + std::fmt::Debug {
    /// Fetches `path` with the given query parameters.
    ///
    /// # Errors
    /// - `UpstreamError::RequestFailed` - Transport failure after retries
    /// - `UpstreamError::UpstreamStatus` - Non-success HTTP status
    /// - `UpstreamError::MalformedPayload` - Response body was not JSON
    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError>;
}

/// Real disclosure API client.
#[derive(Debug)]
pub struct DartClient {
    transport: HttpTransport,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl DartClient {
    /// Creates a client from config; the caller guarantees a key is present.
    pub fn new(config: &DisclosureConfig, api_key: String, transport: HttpTransport) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            api_key,
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl DisclosureProvider for DartClient {
    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        let url = format!("{}/{path}", self.base_url);

        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("crtfc_key", self.api_key.as_str()));

        let response = self.transport.get(&url, &query, self.timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UpstreamStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedPayload {
                reason: e.to_string(),
            })
    }
}

/// Null-object provider used when no API key is configured.
///
/// Answers every fetch with an empty JSON object and never reaches the
/// network, so the service keeps running without credentials.
#[derive(Debug, Default)]
pub struct DisabledDisclosure;

#[async_trait]
impl DisclosureProvider for DisabledDisclosure {
    async fn fetch(&self, _path: &str, _params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        Ok(json!({}))
    }
}

/// Scripted provider for tests and offline development.
///
/// Pops one canned outcome per fetch, in push order, and records every
/// call for assertions. An exhausted queue yields empty objects.
#[derive(Debug, Default)]
pub struct ScriptedDisclosure {
    responses: Mutex<VecDeque<Result<Value, UpstreamError>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedDisclosure {
    /// Creates an empty scripted provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a canned response.
    pub fn push_response(&self, response: Value) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queues a canned failure.
    pub fn push_error(&self, error: UpstreamError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every fetch made so far as `(path, params)` pairs.
    pub fn recorded_calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DisclosureProvider for ScriptedDisclosure {
    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        let recorded = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.calls.lock().unwrap().push((path.to_string(), recorded));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

/// Disclosure operations exposed to the endpoint layer.
#[derive(Debug, Clone)]
pub struct DisclosureService {
    provider: Arc<dyn DisclosureProvider>,
}

impl DisclosureService {
    /// Creates the service, picking the real client when a key is configured
    /// and the disabled null-object otherwise.
    pub fn from_config(config: &DisclosureConfig, transport: HttpTransport) -> Self {
        let provider: Arc<dyn DisclosureProvider> = match config.api_key.clone() {
            Some(key) => Arc::new(DartClient::new(config, key, transport)),
            None => {
                info!("disclosure API key not configured, returning empty results");
                Arc::new(DisabledDisclosure)
            }
        };
        Self { provider }
    }

    /// Creates the service around an explicit provider.
    pub fn with_provider(provider: Arc<dyn DisclosureProvider>) -> Self {
        Self { provider }
    }

    /// Fetches the company profile for a registry code.
    ///
    /// # Errors
    /// - Propagates any [`DisclosureProvider::fetch`] error
    pub async fn company(&self, code: &str) -> Result<Value, UpstreamError> {
        self.provider
            .fetch(COMPANY_PATH, &[("corp_code", code)])
            .await
    }

    /// Fetches annual financial statements for a registry code and year.
    ///
    /// Requests the consolidated statement (`CFS`) first; when its status
    /// is not the success code or its result list is absent or empty, the
    /// standalone statement (`OFS`) is requested and returned instead,
    /// whatever it contains. No third attempt is made.
    ///
    /// # Errors
    /// - Propagates any [`DisclosureProvider::fetch`] error
    pub async fn financial_statements(
        &self,
        code: &str,
        year: &str,
    ) -> Result<Value, UpstreamError> {
        let consolidated = self.statements(code, year, "CFS").await?;
        if statement_usable(&consolidated) {
            return Ok(consolidated);
        }

        debug!(code, year, "consolidated statement unusable, trying standalone");
        self.statements(code, year, "OFS").await
    }

    async fn statements(
        &self,
        code: &str,
        year: &str,
        fs_div: &str,
    ) -> Result<Value, UpstreamError> {
        self.provider
            .fetch(
                STATEMENTS_PATH,
                &[
                    ("corp_code", code),
                    ("bsns_year", year),
                    ("reprt_code", REPORT_CODE),
                    ("fs_div", fs_div),
                ],
            )
            .await
    }
}

/// A statement response is usable when its status is the success code and
/// its result list is a non-empty array.
fn statement_usable(data: &Value) -> bool {
    let status_ok = data.get("status").and_then(Value::as_str) == Some("000");
    let has_rows = data
        .get("list")
        .and_then(Value::as_array)
        .is_some_and(|rows| !rows.is_empty());
    status_ok && has_rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted_service(provider: Arc<ScriptedDisclosure>) -> DisclosureService {
        DisclosureService::with_provider(provider)
    }

    #[tokio::test]
    async fn test_consolidated_statement_preferred() {
        let provider = Arc::new(ScriptedDisclosure::new());
        provider.push_response(json!({
            "status": "000",
            "message": "정상",
            "list": [{"account_nm": "자산총계"}]
        }));

        let service = scripted_service(provider.clone());
        let result = service.financial_statements("00126380", "2023").await.unwrap();

        assert_eq!(result["status"], "000");
        assert_eq!(provider.call_count(), 1);
        let (path, params) = &provider.recorded_calls()[0];
        assert_eq!(path, STATEMENTS_PATH);
        assert!(params.contains(&("fs_div".to_string(), "CFS".to_string())));
        assert!(params.contains(&("reprt_code".to_string(), REPORT_CODE.to_string())));
    }

    #[tokio::test]
    async fn test_falls_back_to_standalone_on_error_status() {
        let provider = Arc::new(ScriptedDisclosure::new());
        provider.push_response(json!({"status": "013", "message": "조회된 데이타가 없습니다."}));
        provider.push_response(json!({
            "status": "000",
            "message": "정상",
            "list": [{"account_nm": "자산총계", "fs_div": "OFS"}]
        }));

        let service = scripted_service(provider.clone());
        let result = service.financial_statements("00126380", "2023").await.unwrap();

        assert_eq!(result["list"][0]["fs_div"], "OFS");
        assert_eq!(provider.call_count(), 2);
        let calls = provider.recorded_calls();
        assert!(calls[0].1.contains(&("fs_div".to_string(), "CFS".to_string())));
        assert!(calls[1].1.contains(&("fs_div".to_string(), "OFS".to_string())));
    }

    #[tokio::test]
    async fn test_falls_back_on_empty_list() {
        let provider = Arc::new(ScriptedDisclosure::new());
        provider.push_response(json!({"status": "000", "message": "정상", "list": []}));
        provider.push_response(json!({"status": "000", "list": [{"fs_div": "OFS"}]}));

        let service = scripted_service(provider.clone());
        let result = service.financial_statements("1", "2023").await.unwrap();

        assert_eq!(result["list"][0]["fs_div"], "OFS");
    }

    #[tokio::test]
    async fn test_standalone_returned_even_when_it_also_fails() {
        let provider = Arc::new(ScriptedDisclosure::new());
        provider.push_response(json!({"status": "013"}));
        provider.push_response(json!({"status": "013", "message": "없음"}));

        let service = scripted_service(provider.clone());
        let result = service.financial_statements("1", "2023").await.unwrap();

        // No third attempt; the standalone response is passed through as-is
        assert_eq!(result["status"], "013");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_disabled_provider_returns_empty_object() {
        let service = DisclosureService::with_provider(Arc::new(DisabledDisclosure));

        let company = service.company("00126380").await.unwrap();
        assert_eq!(company, json!({}));

        // An empty object is never usable, so both statement tiers run
        let statements = service.financial_statements("1", "2023").await.unwrap();
        assert_eq!(statements, json!({}));
    }

    #[test]
    fn test_statement_usable_checks() {
        assert!(statement_usable(
            &json!({"status": "000", "list": [{"a": 1}]})
        ));
        assert!(!statement_usable(&json!({"status": "013", "list": [{"a": 1}]})));
        assert!(!statement_usable(&json!({"status": "000", "list": []})));
        assert!(!statement_usable(&json!({"status": "000"})));
        assert!(!statement_usable(&json!({})));
    }
}
