//! CLI 명령어 구현 모듈.

pub mod offline;
pub mod render;
pub mod stock;

use chartwise_core::DetectionSettings;
use clap::Args;

/// 감지/확인 설정 옵션 (퍼센트 단위).
///
/// 지정하지 않은 값은 설정 파일의 `detection` 섹션을 따릅니다.
#[derive(Debug, Clone, Default, Args)]
pub struct DetectionArgs {
    /// 최소 신뢰도 (%)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_confidence: Option<u8>,

    /// 최소 추세선 R² (%)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_r_squared: Option<u8>,

    /// 겹침 임계값 (%)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub overlap: Option<u8>,

    /// 겹치는 패턴을 제거하지 않음
    #[arg(long)]
    pub keep_overlaps: bool,

    /// 피크 감지 민감도
    #[arg(long)]
    pub peak_order: Option<u32>,

    /// 제외할 패턴 이름 (여러 번 지정 가능)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// 분석 기간 (일)
    #[arg(long)]
    pub days: Option<u32>,
}

impl DetectionArgs {
    /// 기본 설정 위에 옵션을 덮어씁니다.
    pub fn apply(&self, base: &DetectionSettings) -> DetectionSettings {
        let mut settings = base.clone();
        if let Some(v) = self.min_confidence {
            settings.min_confidence_pct = v;
        }
        if let Some(v) = self.min_r_squared {
            settings.min_r_squared_pct = v;
        }
        if let Some(v) = self.overlap {
            settings.overlap_threshold_pct = v;
        }
        if self.keep_overlaps {
            settings.remove_overlaps = false;
        }
        if let Some(v) = self.peak_order {
            settings.peak_order = v;
        }
        if !self.exclude.is_empty() {
            settings.exclude_patterns = self.exclude.clone();
        }
        if self.days.is_some() {
            settings.days = self.days;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_given_values() {
        let base = DetectionSettings::multi_timeframe();
        let args = DetectionArgs {
            min_confidence: Some(40),
            keep_overlaps: true,
            ..Default::default()
        };
        let settings = args.apply(&base);
        assert_eq!(settings.min_confidence_pct, 40);
        assert!(!settings.remove_overlaps);
        assert_eq!(settings.overlap_threshold_pct, 5);
        assert_eq!(settings.exclude_patterns, base.exclude_patterns);
    }

    #[test]
    fn test_exclude_replaces_defaults() {
        let args = DetectionArgs {
            exclude: vec!["Cup and Handle".to_string()],
            ..Default::default()
        };
        let settings = args.apply(&DetectionSettings::multi_timeframe());
        assert_eq!(settings.exclude_patterns, vec!["Cup and Handle".to_string()]);
    }
}
