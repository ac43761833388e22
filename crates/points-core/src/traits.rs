// crates/points-core/src/traits.rs

use crate::events::PointsEvent;

/// Receiver of events emitted by economy operations.
///
/// Operations emit only after every mutation succeeded, so a sink never sees
/// events from an aborted operation.
pub trait EventSink: Send {
    fn emit(&mut self, event: PointsEvent);
}

/// Append-only in-memory event log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<PointsEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PointsEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events appended at or after position `cursor`.
    pub fn since(&self, cursor: usize) -> &[PointsEvent] {
        self.events.get(cursor..).unwrap_or(&[])
    }

    /// Hand over all buffered events, leaving the log empty.
    pub fn take(&mut self) -> Vec<PointsEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: PointsEvent) {
        self.events.push(event);
    }
}

/// Sink that drops everything, for callers that do not observe events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: PointsEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StakeId;

    fn sample() -> PointsEvent {
        PointsEvent::StakeEncumbered {
            stake_id: StakeId::generate(),
            encumbered: false,
        }
    }

    #[test]
    fn test_log_appends_in_order() {
        let mut log = EventLog::new();
        let first = sample();
        let second = sample();
        log.emit(first.clone());
        log.emit(second.clone());
        assert_eq!(log.events(), &[first, second.clone()]);
        assert_eq!(log.since(1), &[second]);
        assert!(log.since(5).is_empty());
    }

    #[test]
    fn test_take_drains() {
        let mut log = EventLog::new();
        log.emit(sample());
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }
}
