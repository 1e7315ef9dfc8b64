//! 대시보드 전반의 에러 타입.
//!
//! 빈 결과(패턴 0개, 추천 없음)는 에러가 아니라 `None`으로 표현합니다.
//! 이 모듈의 에러는 전송 실패, 설정 오류, 잘못된 입력처럼
//! 호출자가 배너로 보여주거나 재시도해야 하는 경우만 다룹니다.

use thiserror::Error;

/// 대시보드 핵심 에러.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 요청 실패 또는 타임아웃
    #[error("전송 에러: {0}")]
    Transport(String),

    /// 백엔드가 성공이 아닌 상태 코드로 응답
    #[error("백엔드 응답 에러 ({status}): {message}")]
    Status {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 또는 사유
        message: String,
    },

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 같은 작업이 이미 진행 중
    #[error("이미 진행 중인 작업: {0}")]
    Busy(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 대시보드 작업을 위한 Result 타입.
pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 전송 실패와 5xx 응답만 재시도 배너 대상입니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            DashboardError::Transport(_) => true,
            DashboardError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 상태 코드 에러를 생성합니다.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        DashboardError::Status {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for DashboardError {
    fn from(err: config::ConfigError) -> Self {
        DashboardError::Config(err.to_string())
    }
}
