//! Frequency condenser (component G): drops low-frequency transitions and the
//! states that become unreachable as a result, producing a fresh TS.

use crate::attr::AttributeValue;
use crate::error::{Error, Result};
use crate::progress::ElapsedTimer;
use crate::state_id::StateIdPool;
use crate::ts::event_log_ts::EventLogTs;
use crate::ts::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// Condenses `log_ts` at relative threshold `theta` (fraction of the trace
/// count a transition must meet or exceed to survive). The initial state is
/// always kept even if it becomes isolated.
pub fn condense(log_ts: &EventLogTs, theta: f64) -> Result<EventLogTs> {
    if !(0.0..=1.0).contains(&theta) {
        return Err(Error::InvalidArgument(format!(
            "threshold {} is outside [0, 1]",
            theta
        )));
    }

    let _timer = ElapsedTimer::start("ts_condense");
    let min_freq = (theta * log_ts.trace_count() as f64).ceil() as u64;
    let ts = log_ts.ts();

    let mut result = EventLogTs::new(StateIdPool::new().initial());
    let initial_src = ts.initial_state();

    // Map from the source TS's NodeIndex to the freshly built TS's NodeIndex.
    let mut mapped: std::collections::HashMap<NodeIndex, NodeIndex> = std::collections::HashMap::new();
    mapped.insert(initial_src, result.ts().initial_state());

    let surviving_edges: Vec<_> = ts
        .transitions()
        .filter(|&e| log_ts.frequency(e) >= min_freq)
        .collect();

    // Determine reachability from the initial state using only surviving edges.
    let mut adjacency: std::collections::HashMap<NodeIndex, Vec<(NodeIndex, _)>> =
        std::collections::HashMap::new();
    for &e in &surviving_edges {
        let src = ts.source(e).unwrap();
        let tgt = ts.target(e).unwrap();
        adjacency.entry(src).or_default().push((tgt, e));
    }

    let mut reachable = HashSet::new();
    reachable.insert(initial_src);
    let mut queue = VecDeque::new();
    queue.push_back(initial_src);
    while let Some(s) = queue.pop_front() {
        if let Some(next) = adjacency.get(&s) {
            for &(tgt, _) in next {
                if reachable.insert(tgt) {
                    queue.push_back(tgt);
                }
            }
        }
    }

    for &e in &surviving_edges {
        let src = ts.source(e).unwrap();
        let tgt = ts.target(e).unwrap();
        if !reachable.contains(&src) || !reachable.contains(&tgt) {
            continue;
        }
        let mapped_src = *mapped
            .entry(src)
            .or_insert_with(|| result.ts_mut().add_anon_state());
        let mapped_tgt = *mapped
            .entry(tgt)
            .or_insert_with(|| result.ts_mut().add_anon_state());
        let label: AttributeValue = ts
            .trans_bundle(e)
            .and_then(|b| b.label.clone())
            .expect("builder-produced transitions are always labeled");
        result.get_or_add_trans_with_freq(mapped_src, mapped_tgt, label, log_ts.frequency(e));
    }

    for (&src, &dst) in &mapped {
        result.set_accepting(dst, log_ts.accepting(src));
    }
    result.set_max_window_size(log_ts.max_window_size().unwrap_or(0));
    for _ in 0..log_ts.trace_count() {
        result.bump_trace_count();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventlog::{VecEvent, VecEventLog, VecTrace};
    use crate::progress::NoopProgress;
    use crate::ts::builder::{PrefixStateFn, TsBuilder};

    fn sample_log_ts() -> EventLogTs {
        let log = VecEventLog::new(vec![
            VecTrace::new(vec![VecEvent::new("A"), VecEvent::new("B"), VecEvent::new("C")]),
            VecTrace::new(vec![VecEvent::new("A"), VecEvent::new("B"), VecEvent::new("D")]),
            VecTrace::new(vec![VecEvent::new("A"), VecEvent::new("C")]),
        ]);
        TsBuilder::build(&log, PrefixStateFn::new(1), NoopProgress).unwrap()
    }

    #[test]
    fn condense_at_half_drops_minority_transition() {
        let log_ts = sample_log_ts();
        let condensed = condense(&log_ts, 0.5).unwrap();
        assert_eq!(condensed.ts().transition_count(), 2);
        assert_eq!(condensed.ts().state_count(), 3);
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let log_ts = sample_log_ts();
        assert!(matches!(
            condense(&log_ts, 1.5),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn monotonic_in_theta() {
        let log_ts = sample_log_ts();
        let low = condense(&log_ts, 0.1).unwrap();
        let high = condense(&log_ts, 0.9).unwrap();
        assert!(high.ts().transition_count() <= low.ts().transition_count());
    }
}
