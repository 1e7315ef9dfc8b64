//! 종목 상세 화면의 패턴 목록 상태.
//!
//! # 상태 전이
//!
//! ```text
//! Idle ──detect──▶ Detecting ──성공──▶ Filtering ──▶ Ready
//!                      │                                │
//!                      └──실패──▶ Error ──retry──▶ Detecting
//! ```
//!
//! - 감지 요청이 진행 중이면 두 번째 요청은 큐에 넣지 않고 `Busy`로 거부합니다.
//!   목록 갱신이 진행 중일 때의 감지 요청도 마찬가지입니다.
//! - 감지 요약은 목록과 함께 반영되므로 실패 후에도 둘은 서로 맞습니다.
//! - 요청이 실패해도 이전에 표시하던 목록은 그대로 유지됩니다.
//! - [`PatternView::close`] 이후 도착한 결과는 상태를 건드리지 않고 버립니다.
//!
//! 화면마다 자기 `PatternView`를 가지며 뷰 사이에 공유되는 상태는 없습니다.
//! 락은 await 지점을 넘어 잡지 않습니다.

use crate::provider::PatternApi;
use chartwise_analytics::{
    chart_pattern_signal, ConfirmationBoost, ConfirmedPattern, FilterConfig,
    PatternConfirmationFilter, RadarModel, SignalAggregator,
};
use chartwise_core::{
    DashboardError, DashboardResult, DetectSummary, DetectionSettings, PatternInstance,
    Recommendation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// 패턴 목록 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternListState {
    /// 아직 아무것도 불러오지 않음
    #[default]
    Idle,
    /// 서버 감지 진행 중
    Detecting,
    /// 확인 필터 적용 중
    Filtering,
    /// 표시 가능
    Ready,
    /// 마지막 감지 실패
    Error,
}

impl PatternListState {
    /// `next` 상태로 전이할 수 있는지 확인합니다.
    pub fn can_transition(self, next: PatternListState) -> bool {
        use PatternListState::*;
        matches!(
            (self, next),
            (Idle, Detecting)
                | (Idle, Filtering)
                | (Detecting, Filtering)
                | (Detecting, Error)
                | (Filtering, Ready)
                | (Ready, Detecting)
                | (Ready, Filtering)
                | (Error, Detecting)
                | (Error, Filtering)
        )
    }
}

impl fmt::Display for PatternListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternListState::Idle => "idle",
            PatternListState::Detecting => "detecting",
            PatternListState::Filtering => "filtering",
            PatternListState::Ready => "ready",
            PatternListState::Error => "error",
        };
        f.write_str(s)
    }
}

/// 화면 렌더링용 상태 복사본.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub stock_id: i64,
    pub state: PatternListState,
    /// 확인 필터를 거친 패턴
    pub patterns: Vec<ConfirmedPattern>,
    /// 마지막 감지 요약
    pub summary: Option<DetectSummary>,
    /// 레이더 모델. 추천이 없으면 `None` ("데이터 없음")
    pub radar: Option<RadarModel>,
    /// 차트에 표시 중인 패턴 ID
    pub visible: BTreeSet<i64>,
    /// 배너로 보여줄 마지막 에러
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct ViewState {
    state: PatternListState,
    patterns: Vec<ConfirmedPattern>,
    patterns_loaded: bool,
    summary: Option<DetectSummary>,
    recommendation: Option<Recommendation>,
    radar: Option<RadarModel>,
    visible: BTreeSet<i64>,
    detecting: bool,
    refreshing: bool,
    loading_recommendation: bool,
    last_error: Option<String>,
    last_settings: Option<DetectionSettings>,
}

impl ViewState {
    fn enter(&mut self, stock_id: i64, next: PatternListState) -> DashboardResult<()> {
        if !self.state.can_transition(next) {
            error!(stock_id, from = %self.state, to = %next, "잘못된 상태 전이");
            return Err(DashboardError::Internal(format!(
                "invalid transition {} -> {}",
                self.state, next
            )));
        }
        info!(stock_id, from = %self.state, to = %next, "패턴 목록 상태 전이");
        self.state = next;
        Ok(())
    }

    /// 새 목록을 반영합니다. 이미 보이던 패턴과 새 패턴은 표시, 사라진 패턴은 선택 해제.
    fn apply_patterns(&mut self, patterns: Vec<ConfirmedPattern>) {
        let previous: BTreeSet<i64> = self.patterns.iter().map(|c| c.pattern.id).collect();
        let current: BTreeSet<i64> = patterns.iter().map(|c| c.pattern.id).collect();

        self.visible = current
            .iter()
            .copied()
            .filter(|id| !previous.contains(id) || self.visible.contains(id))
            .collect();
        self.patterns = patterns;
        self.patterns_loaded = true;
    }
}

/// 종목 하나의 패턴 목록/레이더 상태.
///
/// 복제하면 같은 상태를 공유하는 핸들이 만들어집니다.
#[derive(Clone)]
pub struct PatternView {
    stock_id: i64,
    days: Option<u32>,
    boost: ConfirmationBoost,
    aggregator: SignalAggregator,
    inner: Arc<RwLock<ViewState>>,
    closed: Arc<AtomicBool>,
}

impl PatternView {
    /// 새 뷰를 생성합니다.
    pub fn new(stock_id: i64) -> Self {
        Self {
            stock_id,
            days: None,
            boost: ConfirmationBoost::default(),
            aggregator: SignalAggregator::new(),
            inner: Arc::new(RwLock::new(ViewState::default())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 조회 기간을 설정합니다.
    pub fn with_days(mut self, days: Option<u32>) -> Self {
        self.days = days;
        self
    }

    /// 확인 가중 정책을 설정합니다.
    pub fn with_boost(mut self, boost: ConfirmationBoost) -> Self {
        self.boost = boost;
        self
    }

    pub fn stock_id(&self) -> i64 {
        self.stock_id
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("PatternView RwLock poisoned (read), recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("PatternView RwLock poisoned (write), recovering");
                poisoned.into_inner()
            }
        }
    }

    /// 현재 상태.
    pub fn state(&self) -> PatternListState {
        self.read().state
    }

    /// 감지 요청 진행 여부.
    pub fn is_detecting(&self) -> bool {
        self.read().detecting
    }

    /// 화면 렌더링용 복사본.
    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.read();
        ViewSnapshot {
            stock_id: self.stock_id,
            state: state.state,
            patterns: state.patterns.clone(),
            summary: state.summary,
            radar: state.radar,
            visible: state.visible.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// 확인 패턴 목록.
    pub fn patterns(&self) -> Vec<ConfirmedPattern> {
        self.read().patterns.clone()
    }

    /// 레이더 모델. 추천이 없으면 `None`.
    pub fn radar(&self) -> Option<RadarModel> {
        self.read().radar
    }

    /// 뷰를 닫습니다. 이후 도착하는 결과는 버려집니다.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(stock_id = self.stock_id, "패턴 뷰 닫힘");
        }
    }

    /// 뷰가 닫혔는지 확인합니다.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 닫힌 뒤 도착한 결과인지 확인합니다.
    fn discarded(&self, operation: &str) -> bool {
        if self.is_closed() {
            debug!(stock_id = self.stock_id, operation, "닫힌 뷰의 결과 폐기");
            true
        } else {
            false
        }
    }

    // ==================== 패턴 목록 ====================

    /// 패턴 감지를 실행하고 목록을 다시 불러옵니다.
    ///
    /// 실패하면 `Error` 상태로 바뀌고 이전 목록은 유지됩니다.
    pub async fn detect(
        &self,
        api: &dyn PatternApi,
        settings: &DetectionSettings,
    ) -> DashboardResult<()> {
        if self.discarded("detect") {
            return Ok(());
        }

        {
            let mut state = self.write();
            if state.detecting {
                warn!(stock_id = self.stock_id, "감지 요청이 이미 진행 중");
                return Err(DashboardError::Busy(format!(
                    "detection for stock {}",
                    self.stock_id
                )));
            }
            // 진행 중인 갱신이 감지 도중 목록 상태를 바꾸지 않도록 함께 거부
            if state.refreshing {
                warn!(stock_id = self.stock_id, "패턴 목록 갱신 중에는 감지 불가");
                return Err(DashboardError::Busy(format!(
                    "pattern refresh for stock {}",
                    self.stock_id
                )));
            }
            state.enter(self.stock_id, PatternListState::Detecting)?;
            state.detecting = true;
            state.last_error = None;
            state.last_settings = Some(settings.clone());
        }

        let days = settings.days.or(self.days);
        let request = settings.to_request();

        let detected = api.detect_patterns(self.stock_id, days, &request).await;
        if self.discarded("detect") {
            return Ok(());
        }
        let summary = match detected {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail_detection(e)),
        };

        let fetched = api.fetch_patterns(self.stock_id, days).await;
        if self.discarded("detect") {
            return Ok(());
        }
        let raw = match fetched {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail_detection(e)),
        };

        // 요약은 목록과 함께 반영
        let mut state = self.write();
        state.detecting = false;
        state.summary = Some(summary);
        self.filter_into(&mut state, raw, FilterConfig::from_settings(settings))
    }

    /// 마지막 설정으로 감지를 다시 시도합니다. `Error` 상태에서만 가능합니다.
    pub async fn retry(&self, api: &dyn PatternApi) -> DashboardResult<()> {
        let settings = {
            let state = self.read();
            if state.state != PatternListState::Error {
                return Err(DashboardError::InvalidInput(format!(
                    "retry is only allowed from error state (current: {})",
                    state.state
                )));
            }
            state.last_settings.clone().unwrap_or_default()
        };
        self.detect(api, &settings).await
    }

    fn fail_detection(&self, err: DashboardError) -> DashboardError {
        let mut state = self.write();
        state.detecting = false;
        state.last_error = Some(err.to_string());
        // 전이 실패는 enter에서 기록하고, 호출자에게는 원래 에러를 돌려줌
        let _ = state.enter(self.stock_id, PatternListState::Error);
        warn!(
            stock_id = self.stock_id,
            error = %err,
            retryable = err.is_retryable(),
            kept = state.patterns.len(),
            "패턴 감지 실패, 이전 목록 유지"
        );
        err
    }

    /// 감지 없이 저장된 패턴 목록만 다시 불러옵니다.
    ///
    /// 실패하면 상태와 목록은 그대로 두고 에러만 기록합니다.
    pub async fn refresh_patterns(
        &self,
        api: &dyn PatternApi,
        config: &FilterConfig,
    ) -> DashboardResult<()> {
        if self.discarded("refresh_patterns") {
            return Ok(());
        }

        {
            let mut state = self.write();
            if state.detecting || state.refreshing {
                return Err(DashboardError::Busy(format!(
                    "pattern refresh for stock {}",
                    self.stock_id
                )));
            }
            state.refreshing = true;
        }

        let fetched = api.fetch_patterns(self.stock_id, self.days).await;
        if self.discarded("refresh_patterns") {
            return Ok(());
        }

        let mut state = self.write();
        state.refreshing = false;
        match fetched {
            Ok(raw) => self.filter_into(&mut state, raw, config.clone()),
            Err(e) => {
                warn!(stock_id = self.stock_id, error = %e, "패턴 목록 갱신 실패");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// 확인 필터를 적용해 목록을 교체하고 레이더를 갱신합니다.
    fn filter_into(
        &self,
        state: &mut ViewState,
        raw: Vec<PatternInstance>,
        config: FilterConfig,
    ) -> DashboardResult<()> {
        state.enter(self.stock_id, PatternListState::Filtering)?;

        let received = raw.len();
        let confirmed = PatternConfirmationFilter::new(config).confirm(raw);
        debug!(
            stock_id = self.stock_id,
            received,
            confirmed = confirmed.len(),
            "확인 필터 적용"
        );

        state.apply_patterns(confirmed);
        state.last_error = None;
        self.rebuild_radar(state);
        state.enter(self.stock_id, PatternListState::Ready)
    }

    /// 패턴을 삭제하고 목록을 다시 불러옵니다.
    pub async fn delete_pattern(
        &self,
        api: &dyn PatternApi,
        pattern_id: i64,
        config: &FilterConfig,
    ) -> DashboardResult<()> {
        if self.discarded("delete_pattern") {
            return Ok(());
        }

        if let Err(e) = api.delete_pattern(pattern_id).await {
            if !self.is_closed() {
                self.write().last_error = Some(e.to_string());
            }
            return Err(e);
        }
        if self.discarded("delete_pattern") {
            return Ok(());
        }

        self.write().visible.remove(&pattern_id);
        self.refresh_patterns(api, config).await
    }

    // ==================== 레이더 ====================

    /// 추천을 불러와 레이더를 다시 계산합니다.
    ///
    /// 패턴 목록이 있으면 차트 패턴 축은 화면의 확인 패턴 요약으로 대체됩니다.
    pub async fn load_recommendation(&self, api: &dyn PatternApi) -> DashboardResult<()> {
        if self.discarded("load_recommendation") {
            return Ok(());
        }

        {
            let mut state = self.write();
            if state.loading_recommendation {
                return Err(DashboardError::Busy(format!(
                    "recommendation for stock {}",
                    self.stock_id
                )));
            }
            state.loading_recommendation = true;
        }

        let fetched = api.fetch_recommendation(self.stock_id).await;
        if self.discarded("load_recommendation") {
            return Ok(());
        }

        let mut state = self.write();
        state.loading_recommendation = false;
        match fetched {
            Ok(record) => {
                if record.is_none() {
                    info!(stock_id = self.stock_id, "추천 데이터 없음");
                }
                state.recommendation = record.map(Recommendation::from);
                self.rebuild_radar(&mut state);
                Ok(())
            }
            Err(e) => {
                warn!(stock_id = self.stock_id, error = %e, "추천 조회 실패");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn rebuild_radar(&self, state: &mut ViewState) {
        let recommendation = state.recommendation.map(|rec| {
            if state.patterns_loaded {
                rec.with_chart_pattern(chart_pattern_signal(&state.patterns, &self.boost))
            } else {
                rec
            }
        });
        state.radar = self.aggregator.aggregate(recommendation.as_ref());
    }

    // ==================== 표시 선택 ====================

    /// 패턴 표시 여부를 설정합니다. 목록에 없는 ID는 무시합니다.
    pub fn set_visible(&self, pattern_id: i64, visible: bool) {
        let mut state = self.write();
        if !state.patterns.iter().any(|c| c.pattern.id == pattern_id) {
            return;
        }
        if visible {
            state.visible.insert(pattern_id);
        } else {
            state.visible.remove(&pattern_id);
        }
    }

    /// 패턴 표시 여부를 뒤집고 새 값을 반환합니다.
    pub fn toggle_visible(&self, pattern_id: i64) -> bool {
        let shown = !self.read().visible.contains(&pattern_id);
        self.set_visible(pattern_id, shown);
        self.read().visible.contains(&pattern_id)
    }

    /// 현재 표시 중인 패턴.
    pub fn visible_patterns(&self) -> Vec<ConfirmedPattern> {
        let state = self.read();
        state
            .patterns
            .iter()
            .filter(|c| state.visible.contains(&c.pattern.id))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for PatternView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternView")
            .field("stock_id", &self.stock_id)
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .finish()
    }
}
