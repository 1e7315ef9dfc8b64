//! 패턴 감지에 쓰이는 타임프레임 정의.
//!
//! 백엔드는 1시간봉, 4시간봉, 일봉에서만 차트 패턴을 감지합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들스틱 타임프레임.
///
/// 선언 순서가 곧 정렬 순서이며, 가장 짧은(세밀한) 타임프레임이 먼저 옵니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1시간봉
    #[serde(rename = "1h")]
    H1,
    /// 4시간봉
    #[serde(rename = "4h")]
    H4,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// 지원하는 모든 타임프레임 (세밀한 순).
    pub const ALL: [Timeframe; 3] = [Timeframe::H1, Timeframe::H4, Timeframe::D1];

    /// 타임프레임 태그가 없는 레코드에 적용되는 기본값.
    pub const LEGACY_DEFAULT: Timeframe = Timeframe::D1;

    /// 와이어 태그 문자열.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// 와이어 태그에서 파싱합니다. 대소문자는 구분하지 않습니다.
    pub fn from_tag(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "h1" | "60m" => Some(Timeframe::H1),
            "4h" | "h4" | "240m" => Some(Timeframe::H4),
            "1d" | "d1" | "d" | "daily" => Some(Timeframe::D1),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_ordering_is_finest_first() {
        let mut tfs = vec![Timeframe::D1, Timeframe::H1, Timeframe::H4];
        tfs.sort();
        assert_eq!(tfs, Timeframe::ALL.to_vec());
        assert!(Timeframe::H1 < Timeframe::D1);
    }

    #[test]
    fn test_timeframe_tags() {
        assert_eq!(Timeframe::from_tag("4H"), Some(Timeframe::H4));
        assert_eq!(Timeframe::from_tag("daily"), Some(Timeframe::D1));
        assert_eq!(Timeframe::from_tag("15m"), None);
        assert_eq!(Timeframe::H1.to_string(), "1h");
        assert_eq!(serde_json::to_string(&Timeframe::D1).unwrap(), "\"1d\"");
    }
}
