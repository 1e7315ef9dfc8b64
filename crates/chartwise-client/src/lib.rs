//! 백엔드 연동 및 화면 상태.
//!
//! 이 crate는 다음을 제공합니다:
//! - 대시보드 백엔드 HTTP 클라이언트 (`reqwest`)
//! - 테스트 가능한 `PatternApi` trait
//! - 종목 상세 화면별 패턴 목록/레이더 상태 머신
//! - 프로세스 전역 선택 종목 핸들

pub mod error;
pub mod provider;
pub mod selection;
pub mod view;

pub use error::from_reqwest;
pub use provider::{BackendClient, PatternApi};
pub use selection::{SelectedStock, SelectionGuard};
pub use view::{PatternListState, PatternView, ViewSnapshot};
