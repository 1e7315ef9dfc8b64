//! 대시보드 백엔드 HTTP 클라이언트.
//!
//! # 엔드포인트
//!
//! - `GET  /api/stocks/{id}/patterns?days=N` → `{patterns: [...]}`
//! - `POST /api/stocks/{id}/patterns/detect?days=N` → 감지 요약
//! - `GET  /api/stocks/{id}/recommendation` → 추천 (404 또는 `null`이면 없음)
//! - `DELETE /api/patterns/{pattern_id}`
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use chartwise_client::BackendClient;
//! use chartwise_core::AppConfig;
//!
//! let config = AppConfig::load_default()?;
//! let client = BackendClient::from_config(&config.backend)?;
//! let patterns = client.fetch_patterns(5930, Some(180)).await?;
//! ```

use super::PatternApi;
use crate::error::{from_reqwest, status_error};
use async_trait::async_trait;
use chartwise_core::{
    BackendConfig, DashboardError, DashboardResult, DetectRequest, DetectSummary, PatternInstance,
    PatternsResponse, RecommendationRecord,
};
use reqwest::StatusCode;
use std::time::Duration;

/// 백엔드 API 클라이언트.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DashboardError::Config("backend.base_url이 비어 있습니다".to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// 설정에서 클라이언트를 생성합니다.
    pub fn from_config(config: &BackendConfig) -> DashboardResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn days_query(days: Option<u32>) -> Vec<(&'static str, String)> {
        days.map(|d| vec![("days", d.to_string())])
            .unwrap_or_default()
    }
}

#[async_trait]
impl PatternApi for BackendClient {
    async fn fetch_patterns(
        &self,
        stock_id: i64,
        days: Option<u32>,
    ) -> DashboardResult<Vec<PatternInstance>> {
        let url = self.url(&format!("/api/stocks/{}/patterns", stock_id));
        tracing::debug!(stock_id, ?days, url = %url, "패턴 목록 요청");

        let response = self
            .client
            .get(&url)
            .query(&Self::days_query(days))
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: PatternsResponse = response.json().await.map_err(from_reqwest)?;
        tracing::info!(stock_id, count = body.patterns.len(), "패턴 목록 수신");
        Ok(body.patterns)
    }

    async fn detect_patterns(
        &self,
        stock_id: i64,
        days: Option<u32>,
        request: &DetectRequest,
    ) -> DashboardResult<DetectSummary> {
        let url = self.url(&format!("/api/stocks/{}/patterns/detect", stock_id));
        tracing::debug!(stock_id, ?days, url = %url, "패턴 감지 요청");

        let response = self
            .client
            .post(&url)
            .query(&Self::days_query(days))
            .json(request)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let summary: DetectSummary = response.json().await.map_err(from_reqwest)?;
        tracing::info!(
            stock_id,
            total = summary.total_patterns,
            bullish = summary.bullish_count,
            bearish = summary.bearish_count,
            "패턴 감지 완료"
        );
        Ok(summary)
    }

    async fn fetch_recommendation(
        &self,
        stock_id: i64,
    ) -> DashboardResult<Option<RecommendationRecord>> {
        let url = self.url(&format!("/api/stocks/{}/recommendation", stock_id));
        tracing::debug!(stock_id, url = %url, "추천 요청");

        let response = self.client.get(&url).send().await.map_err(from_reqwest)?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(stock_id, "추천 데이터 없음");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let text = response.text().await.map_err(from_reqwest)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let record: Option<RecommendationRecord> = serde_json::from_str(&text)?;
        Ok(record)
    }

    async fn delete_pattern(&self, pattern_id: i64) -> DashboardResult<()> {
        let url = self.url(&format!("/api/patterns/{}", pattern_id));
        tracing::debug!(pattern_id, url = %url, "패턴 삭제 요청");

        let response = self.client.delete(&url).send().await.map_err(from_reqwest)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DashboardError::NotFound(format!("pattern {}", pattern_id)));
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        tracing::info!(pattern_id, "패턴 삭제 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = BackendClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/api/patterns/3"),
            "http://localhost:8000/api/patterns/3"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = BackendClient::new("", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn test_days_query() {
        assert!(BackendClient::days_query(None).is_empty());
        assert_eq!(
            BackendClient::days_query(Some(90)),
            vec![("days", "90".to_string())]
        );
    }
}
