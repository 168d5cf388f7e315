//! Self-loop converter (component J): lifts self-loops into equivalent
//! acyclic structures, preserving the `label*` language at the looping state.

use crate::ts::event_log_ts::EventLogTs;
use crate::ts::NodeIndex;

/// Whether lifting a self-loop introduces one intermediate state or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfLoopMode {
    /// `s -> s_in -> s_out -> s`, preserving that each loop iteration crosses
    /// a distinct edge; required by the region synthesizer's `process` policy.
    ThreeState,
    /// `s -> s_in -> s`, a cheaper two-state lift.
    TwoState,
}

/// Eliminates every self-loop in `log_ts`, operating over a snapshot of
/// transitions so that newly inserted edges are never themselves revisited.
pub fn convert_self_loops(log_ts: &mut EventLogTs, mode: SelfLoopMode) {
    let self_loops: Vec<_> = log_ts
        .ts()
        .transitions()
        .filter(|&e| log_ts.ts().source(e) == log_ts.ts().target(e))
        .collect();

    for e in self_loops {
        let s = log_ts.ts().source(e).expect("self-loop has a source");
        let label = log_ts
            .ts()
            .trans_bundle(e)
            .and_then(|b| b.label.clone())
            .expect("self-loops carry a label");
        let freq = log_ts.frequency(e);
        log_ts.ts_mut().remove_trans(e).expect("edge exists");

        let s_in: NodeIndex = log_ts.ts_mut().add_anon_state();
        match mode {
            SelfLoopMode::ThreeState => {
                let s_out = log_ts.ts_mut().add_anon_state();
                log_ts.get_or_add_trans_with_freq(s, s_in, label.clone(), freq);
                log_ts.get_or_add_trans_with_freq(s_in, s_out, label.clone(), freq);
                log_ts.get_or_add_trans_with_freq(s_out, s, label, freq);
            }
            SelfLoopMode::TwoState => {
                log_ts.get_or_add_trans_with_freq(s, s_in, label.clone(), freq);
                log_ts.get_or_add_trans_with_freq(s_in, s, label, freq);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttributeValue;
    use crate::state_id::StateIdPool;

    #[test]
    fn three_state_mode_removes_self_loop_and_preserves_reentry() {
        let mut log_ts = EventLogTs::new(StateIdPool::new().initial());
        let x = log_ts.ts().initial_state();
        log_ts.get_or_add_trans_with_freq(x, x, AttributeValue::from("L"), 3);

        convert_self_loops(&mut log_ts, SelfLoopMode::ThreeState);

        assert!(log_ts
            .ts()
            .transitions()
            .all(|e| log_ts.ts().source(e) != log_ts.ts().target(e)));
        assert_eq!(log_ts.ts().state_count(), 3);
        assert_eq!(log_ts.ts().transition_count(), 3);
        assert_eq!(log_ts.ts().out_transitions(x).count(), 1);
    }

    #[test]
    fn two_state_mode_uses_one_intermediate_state() {
        let mut log_ts = EventLogTs::new(StateIdPool::new().initial());
        let x = log_ts.ts().initial_state();
        log_ts.get_or_add_trans_with_freq(x, x, AttributeValue::from("L"), 1);

        convert_self_loops(&mut log_ts, SelfLoopMode::TwoState);

        assert_eq!(log_ts.ts().state_count(), 2);
        assert_eq!(log_ts.ts().transition_count(), 2);
    }
}
