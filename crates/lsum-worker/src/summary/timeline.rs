use lsum_models::{SummarySelection, TimelineEntry};

/// Place each selected segment at the sum of the durations before it.
pub fn build_timeline(selection: &SummarySelection) -> Vec<TimelineEntry> {
    let mut offset = 0.0;
    selection
        .iter()
        .map(|segment| {
            let entry = TimelineEntry {
                segment: segment.clone(),
                offset,
            };
            offset += segment.duration;
            entry
        })
        .collect()
}
