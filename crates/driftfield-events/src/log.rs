//! Bounded in-memory event log with text/JSON export.

use std::collections::VecDeque;

use crate::event::{PendingEvent, StructuralEvent};

/// Oldest-first eviction capacity for [`EventLog`].
pub const EVENT_LOG_CAPACITY: usize = 10_000;

/// Which textual shape [`EventLog::export`] renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventExportFormat {
    /// Newline-delimited `t=<step> | <description>` lines.
    Text,
    /// A JSON array of the structured event objects.
    Json,
}

/// Append-only, capacity-bounded log of [`StructuralEvent`]s.
#[derive(Clone, Debug)]
pub struct EventLog {
    capacity: usize,
    next_id: u64,
    events: VecDeque<StructuralEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        EventLog::new()
    }
}

impl EventLog {
    /// An empty log with the default 10,000-event capacity.
    pub fn new() -> Self {
        EventLog::with_capacity(EVENT_LOG_CAPACITY)
    }

    /// An empty log with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        EventLog {
            capacity: capacity.max(1),
            next_id: 0,
            events: VecDeque::new(),
        }
    }

    /// Append a pending event detected at `step`, assigning it the next
    /// monotonic id and evicting the oldest entry if the log is full.
    pub fn push(&mut self, step: u64, pending: PendingEvent) -> &StructuralEvent {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        let event = StructuralEvent {
            id: self.next_id,
            step,
            kind: pending.kind,
            description: pending.description,
            location: pending.location,
        };
        self.next_id += 1;
        self.events.push_back(event);
        self.events.back().unwrap()
    }

    /// Number of events currently retained.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events oldest-first, in step order.
    pub fn iter(&self) -> impl Iterator<Item = &StructuralEvent> {
        self.events.iter()
    }

    /// Render the full log in the requested [`EventExportFormat`].
    pub fn export(&self, format: EventExportFormat) -> String {
        match format {
            EventExportFormat::Text => self
                .events
                .iter()
                .map(|e| format!("t={} | {}", e.step, e.description))
                .collect::<Vec<_>>()
                .join("\n"),
            EventExportFormat::Json => {
                let events: Vec<&StructuralEvent> = self.events.iter().collect();
                serde_json::to_string(&events).expect("event log serialises cleanly")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StructuralEventKind;

    #[test]
    fn ids_are_monotonic() {
        let mut log = EventLog::new();
        log.push(0, PendingEvent::new(StructuralEventKind::BasinMerge, "a"));
        log.push(1, PendingEvent::new(StructuralEventKind::BasinSplit, "b"));
        let ids: Vec<u64> = log.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn oldest_evicted_at_capacity() {
        let mut log = EventLog::with_capacity(2);
        log.push(0, PendingEvent::new(StructuralEventKind::BasinMerge, "a"));
        log.push(1, PendingEvent::new(StructuralEventKind::BasinMerge, "b"));
        log.push(2, PendingEvent::new(StructuralEventKind::BasinMerge, "c"));
        assert_eq!(log.len(), 2);
        let steps: Vec<u64> = log.iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![1, 2]);
    }

    #[test]
    fn text_export_matches_format() {
        let mut log = EventLog::new();
        log.push(
            7,
            PendingEvent::new(StructuralEventKind::BasinMerge, "count 5 -> 4"),
        );
        assert_eq!(log.export(EventExportFormat::Text), "t=7 | count 5 -> 4");
    }

    #[test]
    fn json_export_is_an_array() {
        let mut log = EventLog::new();
        log.push(1, PendingEvent::new(StructuralEventKind::BasinSplit, "x"));
        let json = log.export(EventExportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn empty_log_exports_empty_string_and_array() {
        let log = EventLog::new();
        assert_eq!(log.export(EventExportFormat::Text), "");
        assert_eq!(log.export(EventExportFormat::Json), "[]");
    }
}
