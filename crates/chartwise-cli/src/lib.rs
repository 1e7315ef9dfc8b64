//! 차트 분석 대시보드 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 추천 파일 → 레이더 출력
//! - 패턴 파일 → 오프라인 확인 파이프라인
//! - 백엔드 연동 종목 상세 (조회, 감지, 삭제)

pub mod commands;

pub use commands::DetectionArgs;
