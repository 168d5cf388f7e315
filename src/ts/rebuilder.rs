//! Variable-window rebuilder (component H): re-replays an event log against a
//! condensed TS, widening the window where needed and falling back to a
//! configurable policy when even the widened window has no home state.

use crate::attr::AttributeValue;
use crate::error::Result;
use crate::eventlog::{Event, EventLog, Trace};
use crate::progress::{ElapsedTimer, ProgressCallback, ProgressOutcome};
use crate::state_id::StateIdPool;
use crate::ts::builder::{PrefixStateFn, StateFn};
use crate::ts::event_log_ts::{Accepting, EventLogTs};
use crate::ts::NodeIndex;

/// What to do with the remainder of a trace once neither the normal nor the
/// widened window lands on a state present in the condensed TS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZsaPolicy {
    /// Abandon the rest of the trace; no further transitions are added for it.
    DropTrace,
    /// Route all remaining events into one shared sink state, a single
    /// anonymous state reused across the whole rebuild run.
    SpecState,
    /// Start a fresh chain of anonymous states from the last known state.
    NewChain,
}

/// Computes a widened window size from the normal one and the configured
/// coefficient. Exposed as a trait so callers can supply a different curve.
pub trait WindowWidening {
    fn widen(&self, normal_window: usize, vwsc: f64) -> usize;
}

/// Default widening formula: `ceil(normal_window * (1 + vwsc))`.
pub struct DefaultWidening;

impl WindowWidening for DefaultWidening {
    fn widen(&self, normal_window: usize, vwsc: f64) -> usize {
        ((normal_window as f64) * (1.0 + vwsc)).ceil() as usize
    }
}

pub struct RebuildOptions {
    pub normal_window: usize,
    pub vwsc: f64,
    pub zsa: ZsaPolicy,
}

/// Rebuilds `log` against `condensed`, widening the window per `opts` and
/// applying `opts.zsa` when a trace falls off the condensed TS entirely.
pub fn rebuild<L, P>(
    log: &L,
    condensed: &EventLogTs,
    opts: &RebuildOptions,
    widening: &dyn WindowWidening,
    mut progress: P,
) -> Result<EventLogTs>
where
    L: EventLog,
    P: ProgressCallback,
{
    let _timer = ElapsedTimer::start("ts_rebuild");
    let widened_window = widening.widen(opts.normal_window, opts.vwsc);

    let mut result = EventLogTs::new(StateIdPool::new().initial());
    result.set_max_window_size(widened_window);

    let mut sink: Option<NodeIndex> = None;
    let total = {
        let mut n = 0usize;
        for _ in log.traces() {
            n += 1;
        }
        n
    };

    for (idx, trace) in log.traces().enumerate() {
        let activities: Vec<AttributeValue> = trace.events().map(|e| e.activity()).collect();
        let mut normal_fn = PrefixStateFn::new(opts.normal_window);
        let mut wide_fn = PrefixStateFn::new(widened_window);
        let mut cursor = result.ts().initial_state();
        let mut dropped = false;

        for pos in 0..activities.len() {
            let normal_id = normal_fn.state_for(&activities, pos);
            let present_in_condensed =
                condensed.ts().get_state(&normal_id).is_some();

            if present_in_condensed {
                let next = result.ts_mut().get_or_add_state(normal_id);
                result.get_or_add_trans_with_freq(cursor, next, activities[pos].clone(), 1);
                cursor = next;
                continue;
            }

            let wide_id = wide_fn.state_for(&activities, pos);
            if condensed.ts().get_state(&wide_id).is_some() {
                let next = result.ts_mut().get_or_add_state(wide_id);
                result.get_or_add_trans_with_freq(cursor, next, activities[pos].clone(), 1);
                cursor = next;
                continue;
            }

            match opts.zsa {
                ZsaPolicy::DropTrace => {
                    dropped = true;
                    break;
                }
                ZsaPolicy::SpecState => {
                    let sink_state = *sink.get_or_insert_with(|| result.ts_mut().add_anon_state());
                    result.get_or_add_trans_with_freq(
                        cursor,
                        sink_state,
                        activities[pos].clone(),
                        1,
                    );
                    cursor = sink_state;
                }
                ZsaPolicy::NewChain => {
                    let next = result.ts_mut().add_anon_state();
                    result.get_or_add_trans_with_freq(cursor, next, activities[pos].clone(), 1);
                    cursor = next;
                }
            }
        }

        if !dropped && !activities.is_empty() {
            result.set_accepting(cursor, Accepting::True);
        }
        result.bump_trace_count();

        if total > 0 {
            let percent = (((idx + 1) * 100) / total) as u8;
            if progress.on_progress(percent) == ProgressOutcome::Cancel {
                return Err(crate::error::Error::Canceled);
            }
        }
    }

    Ok(result)
}
