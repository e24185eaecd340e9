//! Operator-facing narrative log.
//!
//! Entries are what a dashboard shows in its activity feed. Each one is also
//! emitted as a `tracing` event so the same story shows up in diagnostic
//! output.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Alert,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub seq: u64,
    pub timestamp_ms: u64,
    pub message: String,
    pub severity: Severity,
}

/// Bounded, append-only log. Oldest entries are dropped once `capacity` is
/// reached; sequence numbers keep increasing regardless.
#[derive(Debug, Resource)]
pub struct NarrativeLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl Default for NarrativeLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl NarrativeLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(
        &mut self,
        timestamp_ms: u64,
        severity: Severity,
        message: impl Into<String>,
    ) -> u64 {
        let message = message.into();
        match severity {
            Severity::Error => tracing::error!(sim_ms = timestamp_ms, "{message}"),
            Severity::Warning => tracing::warn!(sim_ms = timestamp_ms, "{message}"),
            Severity::Info | Severity::Alert | Severity::Success => {
                tracing::info!(sim_ms = timestamp_ms, severity = ?severity, "{message}")
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            seq,
            timestamp_ms,
            message,
            severity,
        });
        seq
    }

    pub fn info(&mut self, timestamp_ms: u64, message: impl Into<String>) -> u64 {
        self.push(timestamp_ms, Severity::Info, message)
    }

    pub fn warn(&mut self, timestamp_ms: u64, message: impl Into<String>) -> u64 {
        self.push(timestamp_ms, Severity::Warning, message)
    }

    pub fn error(&mut self, timestamp_ms: u64, message: impl Into<String>) -> u64 {
        self.push(timestamp_ms, Severity::Error, message)
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries with `seq >= from_seq` that are still retained.
    pub fn since(&self, from_seq: u64) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.seq >= from_seq)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence number the next entry will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.message.contains(needle))
    }
}
