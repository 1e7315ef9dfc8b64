//! 대시보드 도메인 모델.

mod detection;
mod pattern;
mod recommendation;
mod signal;

pub mod serde_helpers;

pub use detection::*;
pub use pattern::*;
pub use recommendation::*;
pub use signal::*;
