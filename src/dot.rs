//! GraphViz DOT serialization (component Q): the sole output format for mined
//! models. Visitor-style: callers never see the graph types behind the TS and
//! PN directly, only the emitted text.

use crate::error::Result;
use crate::pn::{ArcType, PetriNet};
use crate::ts::event_log_ts::{Accepting, EventLogTs};
use crate::ts::LabeledTs;
use std::fmt::Write as _;

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emits a labeled TS as a DOT digraph. States are labeled with their
/// canonical identity string (or `anon` for anonymous states); accepting
/// states get a double-circle shape.
pub fn emit_ts<D, T>(ts: &LabeledTs<D, T>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "digraph TS {{")?;
    for s in ts.states() {
        let label = ts
            .state_bundle(s)
            .and_then(|b| b.id.as_ref())
            .map(|id| {
                id.values()
                    .iter()
                    .map(|v| v.canonical_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_else(|| "anon".to_string());
        writeln!(out, "  n{} [label=\"{}\"];", s.index(), escape(&label))?;
    }
    for e in ts.transitions() {
        let (src, tgt) = (ts.source(e).unwrap(), ts.target(e).unwrap());
        let label = ts
            .trans_bundle(e)
            .and_then(|b| b.label.as_ref())
            .map(|l| l.canonical_string())
            .unwrap_or_default();
        writeln!(
            out,
            "  n{} -> n{} [label=\"{}\"];",
            src.index(),
            tgt.index(),
            escape(&label)
        )?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

/// Emits an event-log TS, additionally marking accepting states with a
/// double-circle shape and transition labels with their frequency.
pub fn emit_event_log_ts(log_ts: &EventLogTs) -> Result<String> {
    let ts = log_ts.ts();
    let mut out = String::new();
    writeln!(out, "digraph TS {{")?;
    for s in ts.states() {
        let label = ts
            .state_bundle(s)
            .and_then(|b| b.id.as_ref())
            .map(|id| {
                id.values()
                    .iter()
                    .map(|v| v.canonical_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_else(|| "anon".to_string());
        let shape = if log_ts.accepting(s) == Accepting::True {
            "doublecircle"
        } else {
            "circle"
        };
        writeln!(
            out,
            "  n{} [label=\"{}\", shape={}];",
            s.index(),
            escape(&label),
            shape
        )?;
    }
    for e in ts.transitions() {
        let (src, tgt) = (ts.source(e).unwrap(), ts.target(e).unwrap());
        let label = ts
            .trans_bundle(e)
            .and_then(|b| b.label.as_ref())
            .map(|l| l.canonical_string())
            .unwrap_or_default();
        writeln!(
            out,
            "  n{} -> n{} [label=\"{} ({})\"];",
            src.index(),
            tgt.index(),
            escape(&label),
            log_ts.frequency(e)
        )?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

/// Emits a Petri net as a DOT digraph. Transitions are drawn as boxes,
/// positions as circles annotated with their marking; inhibitor arcs use a
/// hollow-circle arrowhead.
pub fn emit_pn<D, A>(net: &PetriNet<D, A>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "digraph PN {{")?;
    for p in net.positions() {
        writeln!(
            out,
            "  n{} [label=\"p{} ({})\", shape=circle];",
            p.index(),
            p.index(),
            net.marking(p)
        )?;
    }
    for t in net.transitions() {
        writeln!(out, "  n{} [label=\"t{}\", shape=box];", t.index(), t.index())?;
    }
    for a in net.arcs() {
        let (src, tgt) = net.arc_endpoints(a).unwrap();
        let bundle = net.arc_bundle(a).unwrap();
        let arrowhead = if bundle.arc_type == ArcType::Inhibitor {
            "odot"
        } else {
            "normal"
        };
        writeln!(
            out,
            "  n{} -> n{} [label=\"{}\", arrowhead={}];",
            src.index(),
            tgt.index(),
            bundle.weight,
            arrowhead
        )?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventlog::{VecEvent, VecEventLog, VecTrace};
    use crate::progress::NoopProgress;
    use crate::ts::builder::{PrefixStateFn, TsBuilder};

    #[test]
    fn emits_well_formed_digraph_block() {
        let log = VecEventLog::new(vec![VecTrace::new(vec![VecEvent::new("A")])]);
        let log_ts = TsBuilder::build(&log, PrefixStateFn::new(1), NoopProgress).unwrap();
        let text = emit_event_log_ts(&log_ts).unwrap();
        assert!(text.starts_with("digraph TS {"));
        assert!(text.trim_end().ends_with('}'));
        assert!(text.contains("doublecircle"));
    }

    #[test]
    fn pn_inhibitor_arc_uses_odot_arrowhead() {
        let mut net: PetriNet<(), ()> = PetriNet::new();
        let p = net.add_position(None);
        let t = net.add_transition(None);
        net.add_arc(p, t, ArcType::Inhibitor, 1, None).unwrap();
        let text = emit_pn(&net).unwrap();
        assert!(text.contains("arrowhead=odot"));
    }
}
