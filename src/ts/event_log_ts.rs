//! Event-log layer on top of the labeled TS (component E): adds a trace
//! count, per-transition frequency, and a tri-state accepting flag per state.

use crate::attr::AttributeValue;
use crate::state_id::StateIdHandle;
use crate::ts::{EdgeIndex, LabeledTs, NodeIndex};
use std::collections::HashMap;

/// Tri-state accepting flag. Never collapses to a plain boolean: `Unset`
/// carries the distinct meaning "no information yet", separate from a
/// deliberate `False`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accepting {
    #[default]
    Unset,
    True,
    False,
}

/// A labeled transition system annotated with trace frequency and acceptance,
/// as built by replaying an event log.
#[derive(Debug)]
pub struct EventLogTs {
    ts: LabeledTs<(), u64>,
    accepting: HashMap<NodeIndex, Accepting>,
    trace_count: u64,
    max_window_size: Option<usize>,
}

impl EventLogTs {
    pub fn new(initial_id: StateIdHandle) -> Self {
        EventLogTs {
            ts: LabeledTs::new(initial_id),
            accepting: HashMap::new(),
            trace_count: 0,
            max_window_size: None,
        }
    }

    pub fn ts(&self) -> &LabeledTs<(), u64> {
        &self.ts
    }

    pub fn ts_mut(&mut self) -> &mut LabeledTs<(), u64> {
        &mut self.ts
    }

    pub fn into_ts(self) -> LabeledTs<(), u64> {
        self.ts
    }

    pub fn trace_count(&self) -> u64 {
        self.trace_count
    }

    pub fn bump_trace_count(&mut self) {
        self.trace_count += 1;
    }

    pub fn max_window_size(&self) -> Option<usize> {
        self.max_window_size
    }

    pub fn set_max_window_size(&mut self, size: usize) {
        self.max_window_size = Some(self.max_window_size.map_or(size, |m| m.max(size)));
    }

    pub fn accepting(&self, state: NodeIndex) -> Accepting {
        self.accepting.get(&state).copied().unwrap_or_default()
    }

    pub fn set_accepting(&mut self, state: NodeIndex, value: Accepting) {
        self.accepting.insert(state, value);
    }

    pub fn frequency(&self, trans: EdgeIndex) -> u64 {
        self.ts
            .trans_bundle(trans)
            .and_then(|b| b.data)
            .unwrap_or(0)
    }

    /// Gets or adds the transition `(src, tgt, label)`, incrementing its
    /// frequency by `delta` (initializing it to `delta` on first creation).
    pub fn get_or_add_trans_with_freq(
        &mut self,
        src: NodeIndex,
        tgt: NodeIndex,
        label: AttributeValue,
        delta: u64,
    ) -> EdgeIndex {
        let edge = self.ts.get_or_add_trans(src, tgt, label);
        let bundle = self
            .ts
            .trans_bundle_mut(edge)
            .expect("just inserted or retrieved");
        bundle.data = Some(bundle.data.unwrap_or(0) + delta);
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_id::StateIdPool;

    #[test]
    fn frequency_accumulates_across_calls() {
        let mut pool = StateIdPool::new();
        let mut log_ts = EventLogTs::new(pool.initial());
        let a = log_ts.ts_mut().add_anon_state();
        let b = log_ts.ts_mut().add_anon_state();
        log_ts.get_or_add_trans_with_freq(a, b, AttributeValue::from("X"), 1);
        let edge = log_ts.get_or_add_trans_with_freq(a, b, AttributeValue::from("X"), 1);
        assert_eq!(log_ts.frequency(edge), 2);
    }

    #[test]
    fn accepting_defaults_to_unset() {
        let pool_init = StateIdPool::new().initial();
        let log_ts = EventLogTs::new(pool_init);
        assert_eq!(log_ts.accepting(log_ts.ts().initial_state()), Accepting::Unset);
    }
}
