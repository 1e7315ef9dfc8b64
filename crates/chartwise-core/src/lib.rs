//! # Chartwise Core
//!
//! 기술적 분석 대시보드의 핵심 도메인 타입을 제공합니다.
//!
//! - 소스별 매매 신호와 추천 레코드
//! - 감지된 차트 패턴 레코드와 타임프레임
//! - 패턴 감지 요청/응답 계약
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
