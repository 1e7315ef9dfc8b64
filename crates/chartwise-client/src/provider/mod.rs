//! 백엔드 API 추상화.
//!
//! 뷰 상태 머신은 [`PatternApi`] trait에만 의존합니다. 실제 HTTP 구현은
//! [`backend::BackendClient`]이며, 테스트에서는 가짜 구현을 주입합니다.

pub mod backend;

pub use backend::BackendClient;

use async_trait::async_trait;
use chartwise_core::{
    DashboardResult, DetectRequest, DetectSummary, PatternInstance, RecommendationRecord,
};

/// 패턴/추천 백엔드 API.
#[async_trait]
pub trait PatternApi: Send + Sync {
    /// 종목의 감지된 패턴 목록을 조회합니다.
    async fn fetch_patterns(
        &self,
        stock_id: i64,
        days: Option<u32>,
    ) -> DashboardResult<Vec<PatternInstance>>;

    /// 패턴 감지를 실행합니다.
    async fn detect_patterns(
        &self,
        stock_id: i64,
        days: Option<u32>,
        request: &DetectRequest,
    ) -> DashboardResult<DetectSummary>;

    /// 종목 추천을 조회합니다. 아직 추천이 없으면 `None`.
    async fn fetch_recommendation(
        &self,
        stock_id: i64,
    ) -> DashboardResult<Option<RecommendationRecord>>;

    /// 패턴을 삭제합니다.
    async fn delete_pattern(&self, pattern_id: i64) -> DashboardResult<()>;
}
