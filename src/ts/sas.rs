//! Single-accepting-state converter (component I): introduces one fresh
//! accepting state and redirects every previously-accepting state to it under
//! a reserved label, relocating acceptance without disturbing other edges.

use crate::attr::AttributeValue;
use crate::ts::event_log_ts::{Accepting, EventLogTs};

/// The reserved label used for the transitions this converter adds.
pub const WF_ACCEPTED_LABEL: &str = "__wf_accepted__";

/// Converts `log_ts` in place, returning the final accepting state `q_f`.
///
/// For every state currently marked [`Accepting::True`], adds a transition to
/// a fresh state labeled [`WF_ACCEPTED_LABEL`]; every other transition on the
/// source state is left untouched. Afterward only `q_f` is accepting.
pub fn convert_to_sas(log_ts: &mut EventLogTs) -> petgraph::stable_graph::NodeIndex {
    let wf_label = AttributeValue::from(WF_ACCEPTED_LABEL);
    let q_f = log_ts.ts_mut().add_anon_state();

    let accepting_states: Vec<_> = log_ts
        .ts()
        .states()
        .filter(|&s| log_ts.accepting(s) == Accepting::True)
        .collect();

    for s in accepting_states {
        log_ts.get_or_add_trans_with_freq(s, q_f, wf_label.clone(), 0);
        log_ts.set_accepting(s, Accepting::False);
    }
    log_ts.set_accepting(q_f, Accepting::True);
    q_f
}
