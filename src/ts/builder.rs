//! TS builder (component F): replays an event log against an injected state
//! function, growing an [`EventLogTs`] one trace at a time.

use crate::attr::AttributeValue;
use crate::error::Result;
use crate::eventlog::{Event, EventLog, Trace};
use crate::progress::{ElapsedTimer, ProgressCallback, ProgressOutcome};
use crate::state_id::{ParikhIdentityPool, StateIdHandle, StateIdPool};
use crate::ts::event_log_ts::{Accepting, EventLogTs};

/// Computes the state identity reached after consuming `activities[..=pos]`
/// of one trace. The builder is oblivious to which variant is injected.
pub trait StateFn {
    fn state_for(&mut self, activities: &[AttributeValue], pos: usize) -> StateIdHandle;
    fn initial(&self) -> StateIdHandle;
    fn reset(&mut self) {}
}

/// Window positioned against the start of the history observed so far: the
/// state after event `pos` is the last `window` activities ending at `pos`.
pub struct PrefixStateFn {
    pool: StateIdPool,
    window: usize,
}

impl PrefixStateFn {
    pub fn new(window: usize) -> Self {
        PrefixStateFn {
            pool: StateIdPool::new(),
            window: window.max(1),
        }
    }
}

impl StateFn for PrefixStateFn {
    fn state_for(&mut self, activities: &[AttributeValue], pos: usize) -> StateIdHandle {
        let start = (pos + 1).saturating_sub(self.window);
        let slice = activities[start..=pos].to_vec();
        self.pool
            .intern(crate::state_id::StateId::from_values(slice))
    }

    fn initial(&self) -> StateIdHandle {
        self.pool.initial()
    }
}

/// Window anchored to the end of the trace: the state at `pos` is the window
/// of up to `window` activities starting at `pos` and looking forward toward
/// the trace's end, rather than backward into history like the prefix
/// function. Requires the full trace to be known (not a true streaming
/// function).
pub struct SuffixStateFn {
    pool: StateIdPool,
    window: usize,
}

impl SuffixStateFn {
    pub fn new(window: usize) -> Self {
        SuffixStateFn {
            pool: StateIdPool::new(),
            window: window.max(1),
        }
    }
}

impl StateFn for SuffixStateFn {
    fn state_for(&mut self, activities: &[AttributeValue], pos: usize) -> StateIdHandle {
        let end = (pos + self.window).min(activities.len() - 1);
        let slice = activities[pos..=end].to_vec();
        self.pool
            .intern(crate::state_id::StateId::from_values(slice))
    }

    fn initial(&self) -> StateIdHandle {
        self.pool.initial()
    }
}

/// Window not required to align with either trace boundary; behaves as a
/// sliding window identical to [`PrefixStateFn`] at interior positions.
pub type InfixStateFn = PrefixStateFn;

/// Parikh (commutative multiset) state function: the state after `pos` is
/// the vector of activity occurrence counts over `activities[..=pos]`.
pub struct ParikhStateFn {
    pool: ParikhIdentityPool,
    counts: Vec<i64>,
}

impl ParikhStateFn {
    pub fn new() -> Self {
        ParikhStateFn {
            pool: ParikhIdentityPool::new(),
            counts: Vec::new(),
        }
    }
}

impl Default for ParikhStateFn {
    fn default() -> Self {
        Self::new()
    }
}

impl StateFn for ParikhStateFn {
    fn state_for(&mut self, activities: &[AttributeValue], pos: usize) -> StateIdHandle {
        self.pool.advance(&mut self.counts, &activities[pos].canonical_string())
    }

    fn initial(&self) -> StateIdHandle {
        self.pool.initial()
    }

    fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Replays `log` against `state_fn`, growing an [`EventLogTs`] anchored at
/// `state_fn`'s initial identity. Invokes `progress` after each trace with a
/// 0..=100 percentage computed from the trace index; on cancellation returns
/// `Err(Error::Canceled)` with the partially built TS discarded (the caller
/// should re-run or accept data loss, per the cooperative-cancellation model).
pub struct TsBuilder {
    log_ts: EventLogTs,
}

impl TsBuilder {
    pub fn new() -> Self {
        let initial = StateIdPool::new().initial();
        TsBuilder {
            log_ts: EventLogTs::new(initial),
        }
    }

    /// Builds a fresh TS from `log` using `state_fn`, reporting progress via
    /// `progress`.
    pub fn build<L, F, P>(log: &L, mut state_fn: F, mut progress: P) -> Result<EventLogTs>
    where
        L: EventLog,
        F: StateFn,
        P: ProgressCallback,
    {
        let _timer = ElapsedTimer::start("ts_builder_build");
        let mut log_ts = EventLogTs::new(state_fn.initial());
        let total = {
            let mut n = 0usize;
            for _ in log.traces() {
                n += 1;
            }
            n
        };
        for (idx, trace) in log.traces().enumerate() {
            state_fn.reset();
            let activities: Vec<AttributeValue> =
                trace.events().map(|e| e.activity()).collect();
            let mut cursor = log_ts.ts().initial_state();
            for pos in 0..activities.len() {
                let next_id = state_fn.state_for(&activities, pos);
                let next = log_ts.ts_mut().get_or_add_state(next_id);
                log_ts.get_or_add_trans_with_freq(cursor, next, activities[pos].clone(), 1);
                cursor = next;
            }
            if !activities.is_empty() {
                log_ts.set_accepting(cursor, Accepting::True);
            }
            log_ts.bump_trace_count();

            if total > 0 {
                let percent = (((idx + 1) * 100) / total) as u8;
                if progress.on_progress(percent) == ProgressOutcome::Cancel {
                    return Err(crate::error::Error::Canceled);
                }
            }
        }
        Ok(log_ts)
    }
}

impl Default for TsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
