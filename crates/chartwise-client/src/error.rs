//! 전송 계층 에러 변환.

use chartwise_core::DashboardError;

/// `reqwest` 에러를 대시보드 에러로 변환합니다.
///
/// 응답 본문 디코딩 실패는 직렬화 에러, 나머지(연결 실패, 타임아웃 등)는
/// 재시도 가능한 전송 에러로 분류합니다.
pub fn from_reqwest(err: reqwest::Error) -> DashboardError {
    if err.is_decode() {
        return DashboardError::Serialization(err.to_string());
    }
    if let Some(status) = err.status() {
        return DashboardError::status(status.as_u16(), err.to_string());
    }
    if err.is_builder() {
        return DashboardError::Config(err.to_string());
    }
    DashboardError::Transport(err.to_string())
}

/// 성공이 아닌 응답을 상태 코드 에러로 변환합니다.
pub(crate) async fn status_error(response: reqwest::Response) -> DashboardError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    DashboardError::status(status.as_u16(), message)
}
