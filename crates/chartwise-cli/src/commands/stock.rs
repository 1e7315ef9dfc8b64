//! 온라인 명령 (`show`, `detect`, `delete`).
//!
//! 명령 하나가 종목 상세 화면 하나에 해당합니다. 세션이 끝나면 뷰를 닫고
//! 종목 선택을 해제합니다.

use anyhow::{Context, Result};
use chartwise_analytics::FilterConfig;
use chartwise_client::{
    BackendClient, PatternApi, PatternView, SelectedStock, SelectionGuard, ViewSnapshot,
};
use chartwise_core::{AppConfig, DashboardError, DetectionSettings};
use tracing::{info, warn};

/// 종목 상세 세션.
pub struct StockSession {
    view: PatternView,
    _selection: SelectionGuard,
}

impl StockSession {
    /// 종목을 선택하고 뷰를 엽니다.
    pub fn open(selected: &SelectedStock, stock_id: i64, days: Option<u32>) -> Self {
        Self {
            view: PatternView::new(stock_id).with_days(days),
            _selection: selected.select(stock_id),
        }
    }

    pub fn view(&self) -> &PatternView {
        &self.view
    }

    /// 저장된 패턴과 추천을 불러옵니다.
    ///
    /// 추천 조회 실패는 배너로만 남기고 패턴 목록은 계속 보여줍니다.
    pub async fn load(&self, api: &dyn PatternApi, config: &FilterConfig) -> Result<()> {
        self.view
            .refresh_patterns(api, config)
            .await
            .context("Failed to load patterns")?;

        if let Err(e) = self.view.load_recommendation(api).await {
            warn!(stock_id = self.view.stock_id(), error = %e, "추천 조회 실패");
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }
}

impl Drop for StockSession {
    fn drop(&mut self) {
        self.view.close();
    }
}

fn backend(config: &AppConfig) -> Result<BackendClient> {
    BackendClient::from_config(&config.backend).context("Failed to create backend client")
}

/// `show`: 저장된 패턴과 레이더를 출력합니다.
pub async fn show(config: &AppConfig, stock_id: i64, days: Option<u32>) -> Result<ViewSnapshot> {
    let api = backend(config)?;
    let selected = SelectedStock::new();
    let session = StockSession::open(&selected, stock_id, days);

    session
        .load(&api, &FilterConfig::from_settings(&config.detection))
        .await?;
    Ok(session.snapshot())
}

/// `detect`: 감지를 실행한 뒤 결과를 출력합니다.
///
/// Ctrl-C로 중단하면 뷰를 닫고 늦게 도착한 결과는 버립니다.
pub async fn detect(
    config: &AppConfig,
    stock_id: i64,
    settings: &DetectionSettings,
) -> Result<Option<ViewSnapshot>> {
    let api = backend(config)?;
    let selected = SelectedStock::new();
    let session = StockSession::open(&selected, stock_id, settings.days);

    info!(stock_id, "패턴 감지 시작");
    tokio::select! {
        result = session.view().detect(&api, settings) => {
            if let Err(e) = result {
                if matches!(e, DashboardError::Busy(_)) {
                    return Err(e.into());
                }
                // Error 상태와 이전 목록은 스냅샷으로 보여줌
                warn!(stock_id, error = %e, retryable = e.is_retryable(), "패턴 감지 실패");
                return Ok(Some(session.snapshot()));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!(stock_id, "사용자가 감지를 중단함");
            session.view().close();
            return Ok(None);
        }
    }

    if let Err(e) = session.view().load_recommendation(&api).await {
        warn!(stock_id, error = %e, "추천 조회 실패");
    }
    Ok(Some(session.snapshot()))
}

/// `delete`: 패턴을 삭제한 뒤 목록을 다시 출력합니다.
pub async fn delete(config: &AppConfig, stock_id: i64, pattern_id: i64) -> Result<ViewSnapshot> {
    let api = backend(config)?;
    let selected = SelectedStock::new();
    let session = StockSession::open(&selected, stock_id, config.detection.days);
    let filter = FilterConfig::from_settings(&config.detection);

    session
        .view()
        .delete_pattern(&api, pattern_id, &filter)
        .await
        .with_context(|| format!("Failed to delete pattern {}", pattern_id))?;

    if let Err(e) = session.view().load_recommendation(&api).await {
        warn!(stock_id, error = %e, "추천 조회 실패");
    }
    Ok(session.snapshot())
}
