//! Per-class segment allocation.
//!
//! For each budget label, in budget order:
//!
//! - `D` is the label's mean segment duration rounded to whole seconds.
//! - With an absolute target `T`, the label gets `round(p * T / D)` segments.
//! - With the count-share target, it gets `floor(p * count)` segments.
//! - The first segments of that label, in input order, are taken; never
//!   more than exist.
//!
//! Labels with no segments contribute nothing and their share is not
//! handed to other labels. Labels whose mean is zero or undefined are
//! skipped with a warning.

use tracing::{debug, info, warn};

use lsum_models::{
    ClassBudgetSpec, ClassLabel, ClassifiedSegment, SelectedSegment, SummarySelection,
    SummaryTarget,
};

/// How many segments of a label to take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationPolicy {
    /// `round(proportion * target_secs / mean_duration)`
    DurationBudget { target_secs: f64 },
    /// `floor(proportion * available)`
    CountShare,
}

impl From<SummaryTarget> for AllocationPolicy {
    fn from(target: SummaryTarget) -> Self {
        match target {
            SummaryTarget::Duration(target_secs) => Self::DurationBudget { target_secs },
            SummaryTarget::ShareOfCount => Self::CountShare,
        }
    }
}

impl AllocationPolicy {
    /// Requested count before capping at the number available.
    fn requested(&self, proportion: f64, mean_duration: f64, available: usize) -> usize {
        let count = match *self {
            Self::DurationBudget { target_secs } => (proportion * target_secs / mean_duration).round(),
            Self::CountShare => (proportion * available as f64).floor(),
        };
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }
}

/// Select segments for the summary according to `budget`.
pub fn allocate(segments: &[ClassifiedSegment], budget: &ClassBudgetSpec) -> SummarySelection {
    let policy = AllocationPolicy::from(budget.target_duration);

    let unlabeled = segments.iter().filter(|s| s.class.is_none()).count();
    let undurated = segments
        .iter()
        .filter(|s| s.class.is_some() && s.duration.is_none())
        .count();
    if unlabeled > 0 {
        debug!(segments = unlabeled, "Ignoring unlabeled segments");
    }
    if undurated > 0 {
        warn!(
            segments = undurated,
            "Ignoring labeled segments without a duration; run enrich first"
        );
    }

    let mut selected = Vec::new();

    for share in &budget.classes {
        let candidates: Vec<(&ClassifiedSegment, f64)> = segments
            .iter()
            .filter(|s| s.class.as_ref() == Some(&share.label))
            .filter_map(|s| s.duration.map(|d| (s, d)))
            .collect();

        if candidates.is_empty() {
            debug!(label = %share.label, "Label absent from input, selecting nothing");
            continue;
        }

        let mean = candidates.iter().map(|(_, d)| d).sum::<f64>() / candidates.len() as f64;
        let mean_duration = mean.round();
        if !(mean_duration > 0.0) {
            warn!(
                label = %share.label,
                mean,
                "Mean segment duration rounds to zero, skipping label"
            );
            continue;
        }

        let requested = policy.requested(share.proportion, mean_duration, candidates.len());
        let take = requested.min(candidates.len());

        info!(
            label = %share.label,
            proportion = share.proportion,
            mean_duration,
            available = candidates.len(),
            requested,
            selected = take,
            "Allocated label"
        );

        selected.extend(
            candidates
                .into_iter()
                .take(take)
                .map(|(s, duration)| select(s, &share.label, duration)),
        );
    }

    SummarySelection::new(selected)
}

fn select(segment: &ClassifiedSegment, label: &ClassLabel, duration: f64) -> SelectedSegment {
    SelectedSegment {
        recording: segment.recording.clone(),
        name: segment.name.clone(),
        class: label.clone(),
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsum_models::ClassShare;

    fn segments(label: &str, durations: &[f64]) -> Vec<ClassifiedSegment> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                ClassifiedSegment::new(
                    format!("lecture_{}", label),
                    format!("part_{}", i),
                    Some(ClassLabel::from(label)),
                    Some(d),
                )
            })
            .collect()
    }

    fn budget(shares: &[(&str, f64)], target: SummaryTarget) -> ClassBudgetSpec {
        ClassBudgetSpec::new(
            shares.iter().map(|&(l, p)| ClassShare::new(l, p)).collect(),
            target,
        )
    }

    #[test]
    fn absent_label_gets_nothing_and_is_not_redistributed() {
        let mut input = segments("boring", &[10.0; 6]);
        input.extend(segments("neutral", &[20.0; 4]));
        let spec = budget(
            &[("boring", 0.3), ("interesting", 0.4), ("neutral", 0.3)],
            SummaryTarget::Duration(100.0),
        );

        let selection = allocate(&input, &spec);

        assert_eq!(selection.count_for(&ClassLabel::from("boring")), 3);
        assert_eq!(selection.count_for(&ClassLabel::from("neutral")), 2);
        assert_eq!(selection.count_for(&ClassLabel::from("interesting")), 0);
        assert_eq!(selection.total_duration(), 70.0);
    }

    #[test]
    fn selection_follows_budget_order_then_input_order() {
        let mut input = segments("neutral", &[20.0; 4]);
        input.extend(segments("boring", &[10.0; 6]));
        let spec = budget(
            &[("boring", 0.3), ("neutral", 0.3)],
            SummaryTarget::Duration(100.0),
        );

        let selection = allocate(&input, &spec);
        let order: Vec<_> = selection
            .iter()
            .map(|s| format!("{}/{}", s.class, s.name))
            .collect();

        assert_eq!(
            order,
            vec![
                "boring/part_0",
                "boring/part_1",
                "boring/part_2",
                "neutral/part_0",
                "neutral/part_1",
            ]
        );
    }

    #[test]
    fn never_selects_more_than_available() {
        let input = segments("interesting", &[5.0, 5.0]);
        let spec = budget(&[("interesting", 1.0)], SummaryTarget::Duration(600.0));

        let selection = allocate(&input, &spec);

        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn count_share_uses_floor() {
        let input = segments("boring", &[12.0; 7]);
        let spec = budget(&[("boring", 0.3)], SummaryTarget::ShareOfCount);

        // floor(0.3 * 7) = 2
        assert_eq!(allocate(&input, &spec).len(), 2);
    }

    #[test]
    fn zero_mean_duration_is_skipped() {
        let mut input = segments("boring", &[0.2, 0.3]);
        input.extend(segments("neutral", &[10.0; 3]));
        let spec = budget(
            &[("boring", 0.5), ("neutral", 0.5)],
            SummaryTarget::Duration(20.0),
        );

        let selection = allocate(&input, &spec);

        assert_eq!(selection.count_for(&ClassLabel::from("boring")), 0);
        assert_eq!(selection.count_for(&ClassLabel::from("neutral")), 1);
    }

    #[test]
    fn rows_without_label_or_duration_are_ignored() {
        let mut input = segments("boring", &[10.0; 2]);
        input.push(ClassifiedSegment::new("lecture_x", "part_9", None, Some(10.0)));
        input.push(ClassifiedSegment::new(
            "lecture_x",
            "part_10",
            Some(ClassLabel::from("boring")),
            None,
        ));
        let spec = budget(&[("boring", 1.0)], SummaryTarget::ShareOfCount);

        let selection = allocate(&input, &spec);

        assert_eq!(selection.len(), 2);
        assert!(selection.iter().all(|s| s.recording.as_str() == "lecture_boring"));
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(allocate(&[], &ClassBudgetSpec::default()).is_empty());
    }

    #[test]
    fn policy_from_target() {
        assert_eq!(
            AllocationPolicy::from(SummaryTarget::Duration(90.0)),
            AllocationPolicy::DurationBudget { target_secs: 90.0 }
        );
        assert_eq!(
            AllocationPolicy::from(SummaryTarget::ShareOfCount),
            AllocationPolicy::CountShare
        );
    }
}
