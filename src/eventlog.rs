//! Narrow external-collaborator contract for event logs, plus an in-memory
//! reference implementation used by tests and by callers who have already
//! materialized their log.

use crate::attr::AttributeValue;
use std::collections::BTreeMap;

/// A single recorded event within a trace.
pub trait Event {
    fn activity(&self) -> AttributeValue;
    fn attribute(&self, name: &str) -> Option<AttributeValue>;
}

/// An ordered sequence of events representing one case's execution.
pub trait Trace {
    type EventRef<'a>: Event
    where
        Self: 'a;
    type Iter<'a>: Iterator<Item = Self::EventRef<'a>>
    where
        Self: 'a;

    fn events(&self) -> Self::Iter<'_>;
}

/// A log of traces, consumed single-pass by the builder (component F).
pub trait EventLog {
    type TraceRef<'a>: Trace
    where
        Self: 'a;
    type Iter<'a>: Iterator<Item = Self::TraceRef<'a>>
    where
        Self: 'a;

    fn traces(&self) -> Self::Iter<'_>;
}

/// A single in-memory event: an activity plus a flat attribute map.
#[derive(Debug, Clone, Default)]
pub struct VecEvent {
    pub activity: AttributeValue,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl VecEvent {
    pub fn new(activity: impl Into<AttributeValue>) -> Self {
        VecEvent {
            activity: activity.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

impl Event for VecEvent {
    fn activity(&self) -> AttributeValue {
        self.activity.clone()
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).cloned()
    }
}

impl Event for &VecEvent {
    fn activity(&self) -> AttributeValue {
        (*self).activity.clone()
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        (*self).attributes.get(name).cloned()
    }
}

/// A single in-memory trace: an ordered list of [`VecEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct VecTrace {
    pub events: Vec<VecEvent>,
}

impl VecTrace {
    pub fn new(events: Vec<VecEvent>) -> Self {
        VecTrace { events }
    }
}

impl Trace for VecTrace {
    type EventRef<'a> = &'a VecEvent;
    type Iter<'a> = std::slice::Iter<'a, VecEvent>;

    fn events(&self) -> Self::Iter<'_> {
        self.events.iter()
    }
}

/// An in-memory event log: a flat list of [`VecTrace`]s.
#[derive(Debug, Clone, Default)]
pub struct VecEventLog {
    pub traces: Vec<VecTrace>,
}

impl VecEventLog {
    pub fn new(traces: Vec<VecTrace>) -> Self {
        VecEventLog { traces }
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }
}

impl Trace for &VecTrace {
    type EventRef<'a> = &'a VecEvent where Self: 'a;
    type Iter<'a> = std::slice::Iter<'a, VecEvent> where Self: 'a;

    fn events(&self) -> Self::Iter<'_> {
        self.events.iter()
    }
}

impl EventLog for VecEventLog {
    type TraceRef<'a> = &'a VecTrace;
    type Iter<'a> = std::slice::Iter<'a, VecTrace>;

    fn traces(&self) -> Self::Iter<'_> {
        self.traces.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_traces_and_events_in_order() {
        let log = VecEventLog::new(vec![VecTrace::new(vec![
            VecEvent::new("A"),
            VecEvent::new("B"),
        ])]);
        let trace = log.traces().next().unwrap();
        let activities: Vec<String> = trace
            .events()
            .map(|e| e.activity().canonical_string())
            .collect();
        assert_eq!(activities, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn event_attributes_round_trip() {
        let event = VecEvent::new("A").with_attribute("resource", AttributeValue::from("bob"));
        assert_eq!(
            event.attribute("resource"),
            Some(AttributeValue::from("bob"))
        );
        assert_eq!(event.attribute("missing"), None);
    }
}
