//! 3단계: 다중 타임프레임 확인 병합.
//!
//! 서로 다른 타임프레임에서 따로 감지된 "같은" 구조 패턴(이름과 방향이 같고
//! 구간이 겹침)을 하나의 `ConfirmedPattern`으로 합칩니다.
//!
//! 구조적 식별 키(이름 + 방향)로 묶은 뒤, 각 묶음 안에서 겹침 관계의
//! 연결 요소를 fold로 구합니다. 연결 요소는 입력 순서와 무관하므로
//! 타임프레임 목록을 더 넣어도 기존 패턴의 확인 수준은 줄어들지 않습니다.

use super::overlap::OverlapPolicy;
use super::{ConfirmedPattern, TimeframePatterns};
use chartwise_core::{PatternInstance, PatternSignal, Timeframe};
use std::collections::{BTreeMap, BTreeSet};

/// 타임프레임 간 방향 일치도를 계산하는 정책.
pub trait AlignmentPolicy {
    /// `agreeing`: 같은 방향으로 패턴을 확인한 타임프레임,
    /// `examined`: 해당 구간을 살펴본 전체 타임프레임 (`agreeing` 포함).
    fn score(&self, agreeing: &BTreeSet<Timeframe>, examined: &BTreeSet<Timeframe>) -> f64;
}

/// 일치 타임프레임 수 / 살펴본 타임프레임 수.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionAgreement;

impl AlignmentPolicy for RegionAgreement {
    fn score(&self, agreeing: &BTreeSet<Timeframe>, examined: &BTreeSet<Timeframe>) -> f64 {
        let total = examined.union(agreeing).count();
        if total == 0 {
            return 0.0;
        }
        agreeing.len() as f64 / total as f64
    }
}

/// 병합 후보 한 건.
#[derive(Debug, Clone)]
struct Member<'a> {
    /// 이 패턴이 들어 있던 목록의 타임프레임
    timeframe: Timeframe,
    /// 목록 타임프레임 + 레코드 자체의 태그
    origins: BTreeSet<Timeframe>,
    /// 입력 내 위치 (결정적 대표 선택용)
    position: usize,
    pattern: &'a PatternInstance,
}

type StructuralKey = (String, PatternSignal);

/// 타임프레임별 목록을 확인 패턴 목록으로 병합합니다.
///
/// 결과는 구간 시작, 이름, ID 순으로 정렬됩니다.
pub fn merge_timeframes(
    lists: &[TimeframePatterns],
    overlap: &dyn OverlapPolicy,
    alignment: &dyn AlignmentPolicy,
) -> Vec<ConfirmedPattern> {
    let members = collect_members(lists);

    // 구조적 식별 키로 묶기
    let groups: BTreeMap<StructuralKey, Vec<Member<'_>>> =
        members.into_iter().fold(BTreeMap::new(), |mut groups, member| {
            let key = (
                member.pattern.pattern_name.trim().to_ascii_lowercase(),
                member.pattern.signal,
            );
            groups.entry(key).or_insert_with(Vec::new).push(member);
            groups
        });

    let mut confirmed: Vec<ConfirmedPattern> = groups
        .into_values()
        .flat_map(|group| cluster(group, overlap))
        .map(|members| build_confirmed(members, lists, overlap, alignment))
        .collect();

    confirmed.sort_by(|a, b| {
        a.pattern
            .start_date
            .cmp(&b.pattern.start_date)
            .then(a.pattern.index_span().0.cmp(&b.pattern.index_span().0))
            .then_with(|| a.pattern.pattern_name.cmp(&b.pattern.pattern_name))
            .then(a.pattern.id.cmp(&b.pattern.id))
    });

    tracing::debug!(
        timeframes = lists.len(),
        confirmed = confirmed.len(),
        multi = confirmed.iter().filter(|c| c.is_multi_timeframe()).count(),
        "Timeframe merge applied"
    );
    confirmed
}

fn collect_members(lists: &[TimeframePatterns]) -> Vec<Member<'_>> {
    lists
        .iter()
        .flat_map(|list| list.patterns.iter().map(move |p| (list.timeframe, p)))
        .enumerate()
        .map(|(position, (timeframe, pattern))| {
            let mut origins: BTreeSet<Timeframe> =
                pattern.detected_on_timeframes.iter().copied().collect();
            origins.insert(timeframe);
            Member {
                timeframe,
                origins,
                position,
                pattern,
            }
        })
        .collect()
}

/// 묶음 안에서 겹침 관계의 연결 요소를 구합니다.
///
/// 같은 목록에서 온 패턴끼리는 직접 잇지 않습니다. 같은 타임프레임의
/// 중복 처리는 2단계의 몫입니다.
fn cluster<'a>(group: Vec<Member<'a>>, overlap: &dyn OverlapPolicy) -> Vec<Vec<Member<'a>>> {
    group
        .into_iter()
        .fold(Vec::<Vec<Member<'a>>>::new(), |clusters, member| {
            let (touching, mut rest): (Vec<_>, Vec<_>) =
                clusters.into_iter().partition(|cluster| {
                    cluster.iter().any(|other| {
                        other.timeframe != member.timeframe
                            && overlap.overlaps(other.pattern, member.pattern)
                    })
                });

            let mut merged: Vec<Member<'a>> = touching.into_iter().flatten().collect();
            merged.push(member);
            rest.push(merged);
            rest
        })
}

fn build_confirmed(
    mut cluster: Vec<Member<'_>>,
    lists: &[TimeframePatterns],
    overlap: &dyn OverlapPolicy,
    alignment: &dyn AlignmentPolicy,
) -> ConfirmedPattern {
    // 가장 세밀한 타임프레임 → 높은 신뢰도 → 입력 순서
    cluster.sort_by(|a, b| {
        a.timeframe
            .cmp(&b.timeframe)
            .then(b.pattern.confidence().total_cmp(&a.pattern.confidence()))
            .then(a.position.cmp(&b.position))
    });

    let agreeing: BTreeSet<Timeframe> = cluster
        .iter()
        .flat_map(|m| m.origins.iter().copied())
        .collect();
    let confirmation_level = agreeing.len();

    let alignment_score = if confirmation_level >= 2 {
        let examined = examined_timeframes(&cluster, lists, overlap, &agreeing);
        Some(alignment.score(&agreeing, &examined))
    } else {
        None
    };

    let representative = cluster[0].pattern;
    let base_confidence = representative.confidence();
    let merged_ids: Vec<i64> = cluster.iter().map(|m| m.pattern.id).collect();

    let mut pattern = representative.clone();
    pattern.detected_on_timeframes = agreeing.into_iter().collect();

    ConfirmedPattern {
        pattern,
        confirmation_level,
        alignment_score,
        base_confidence,
        merged_ids,
    }
}

/// 구간을 살펴본 타임프레임: 일치 타임프레임 + 같은 구간에서
/// 반대 방향 패턴이 나온 타임프레임.
fn examined_timeframes(
    cluster: &[Member<'_>],
    lists: &[TimeframePatterns],
    overlap: &dyn OverlapPolicy,
    agreeing: &BTreeSet<Timeframe>,
) -> BTreeSet<Timeframe> {
    let direction = cluster[0].pattern.signal;
    let mut examined = agreeing.clone();

    for list in lists {
        let disagrees = list.patterns.iter().any(|candidate| {
            candidate.signal != PatternSignal::Neutral
                && candidate.signal != direction
                && cluster
                    .iter()
                    .any(|m| overlap.overlaps(m.pattern, candidate))
        });
        if disagrees {
            examined.insert(list.timeframe);
        }
    }
    examined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::overlap::ShorterSpanOverlap;

    fn hs(id: i64, confidence: f64) -> PatternInstance {
        PatternInstance::new(id, "Head and Shoulders", PatternSignal::Bearish, 20, 60, confidence)
    }

    fn list(timeframe: Timeframe, patterns: Vec<PatternInstance>) -> TimeframePatterns {
        TimeframePatterns::new(timeframe, patterns)
    }

    fn merge(lists: &[TimeframePatterns]) -> Vec<ConfirmedPattern> {
        merge_timeframes(lists, &ShorterSpanOverlap::default(), &RegionAgreement)
    }

    #[test]
    fn test_three_timeframe_confirmation() {
        let lists = vec![
            list(Timeframe::H4, vec![hs(2, 0.7)]),
            list(Timeframe::H1, vec![hs(1, 0.6)]),
            list(Timeframe::D1, vec![hs(3, 0.65)]),
        ];
        let out = merge(&lists);

        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.confirmation_level, 3);
        assert_eq!(c.base_confidence, 0.6);
        assert_eq!(c.pattern.id, 1);
        assert_eq!(
            c.timeframes(),
            BTreeSet::from([Timeframe::H1, Timeframe::H4, Timeframe::D1])
        );
        assert_eq!(c.alignment_score, Some(1.0));
        assert_eq!(c.merged_ids.len(), 3);
    }

    #[test]
    fn test_single_timeframe_has_no_alignment() {
        let out = merge(&[list(Timeframe::D1, vec![hs(1, 0.6)])]);
        assert_eq!(out[0].confirmation_level, 1);
        assert_eq!(out[0].alignment_score, None);
    }

    #[test]
    fn test_direction_and_name_split_groups() {
        let bullish = PatternInstance::new(9, "Head and Shoulders", PatternSignal::Bullish, 20, 60, 0.8);
        let other = PatternInstance::new(8, "Double Top", PatternSignal::Bearish, 20, 60, 0.8);
        let out = merge(&[
            list(Timeframe::H1, vec![hs(1, 0.6)]),
            list(Timeframe::H4, vec![bullish, other]),
        ]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| c.confirmation_level == 1));
    }

    #[test]
    fn test_disagreeing_timeframe_lowers_alignment() {
        let inverse = PatternInstance::new(5, "Double Bottom", PatternSignal::Bullish, 25, 55, 0.7);
        let out = merge(&[
            list(Timeframe::H1, vec![hs(1, 0.6)]),
            list(Timeframe::H4, vec![hs(2, 0.7)]),
            list(Timeframe::D1, vec![inverse]),
        ]);
        let confirmed = out.iter().find(|c| c.pattern.id == 1).unwrap();
        assert_eq!(confirmed.confirmation_level, 2);
        let score = confirmed.alignment_score.unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_bridging_instance_joins_clusters() {
        let early = PatternInstance::new(1, "Bearish Flag", PatternSignal::Bearish, 0, 20, 0.5);
        let late = PatternInstance::new(2, "Bearish Flag", PatternSignal::Bearish, 40, 60, 0.5);
        let bridge = PatternInstance::new(3, "Bearish Flag", PatternSignal::Bearish, 10, 50, 0.5);

        let apart = merge(&[list(Timeframe::H1, vec![early.clone(), late.clone()])]);
        assert_eq!(apart.len(), 2);

        let joined = merge(&[
            list(Timeframe::H1, vec![early, late]),
            list(Timeframe::H4, vec![bridge]),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].confirmation_level, 2);
    }

    #[test]
    fn test_record_tags_extend_origin() {
        let pre_tagged = hs(1, 0.6).on_timeframes(&[Timeframe::H4]);
        let out = merge(&[list(Timeframe::H1, vec![pre_tagged])]);
        assert_eq!(out[0].confirmation_level, 2);
    }
}
