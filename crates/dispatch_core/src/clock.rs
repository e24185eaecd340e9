//! Simulation clock: a min-heap of timestamped engine events.
//!
//! Time is simulated milliseconds. Events with equal timestamps pop in the
//! order they were scheduled, which keeps a run fully deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The current scenario stage's dwell time has elapsed.
    ScenarioAdvance,
    /// Validate and start a dispatch (subject: [`EventSubject::Dispatch`]).
    DispatchRequested,
    /// One animation tick for a responder.
    MoveStep,
    /// A responder reached its incident.
    ResponderArrived,
    /// The settle delay after arrival has elapsed.
    SettleComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Responder(Entity),
    Dispatch { responder: Entity, incident: Entity },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    /// Scheduling order; breaks timestamp ties first-in first-out.
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being processed by the current schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let event = Event {
            timestamp: timestamp.max(self.now),
            seq: self.next_seq,
            kind,
            subject,
        };
        self.next_seq += 1;
        self.events.push(event);
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject);
    }

    /// An event stamped with the current time that never enters the queue,
    /// for requests executed synchronously outside the run loop.
    pub fn immediate(&mut self, kind: EventKind, subject: Option<EventSubject>) -> Event {
        let event = Event {
            timestamp: self.now,
            seq: self.next_seq,
            kind,
            subject,
        };
        self.next_seq += 1;
        event
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    /// Move time forward without processing anything. Never moves backwards
    /// and never skips past a pending event.
    pub fn advance_to(&mut self, timestamp: u64) {
        let limit = self.next_event_time().unwrap_or(u64::MAX);
        self.now = self.now.max(timestamp.min(limit));
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count of pending events of `kind`.
    pub fn pending_of(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::MoveStep, None);
        clock.schedule_at(5, EventKind::ScenarioAdvance, None);
        clock.schedule_at(20, EventKind::SettleComplete, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_scheduling_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(7, EventKind::SettleComplete, None);
        clock.schedule_at(7, EventKind::ScenarioAdvance, None);
        clock.schedule_at(7, EventKind::MoveStep, None);

        let kinds: Vec<EventKind> = std::iter::from_fn(|| clock.pop_next())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::SettleComplete,
                EventKind::ScenarioAdvance,
                EventKind::MoveStep
            ]
        );
    }

    #[test]
    fn advance_to_stops_at_the_next_pending_event() {
        let mut clock = SimulationClock::default();
        clock.advance_to(100);
        assert_eq!(clock.now(), 100);

        clock.schedule_in(50, EventKind::MoveStep, None);
        clock.advance_to(1_000);
        assert_eq!(clock.now(), 150);

        clock.advance_to(10);
        assert_eq!(clock.now(), 150);
    }
}
