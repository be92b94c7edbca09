//! Record every degradation event: component, reason, fallback used,
//! timestamp, recovery status.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::models::DegradationEvent;

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// Recovered to normal operation.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Bounded log of degradation events, newest last.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    events: VecDeque<TrackedDegradation>,
    max_events: usize,
}

impl DegradationTracker {
    pub const DEFAULT_MAX_EVENTS: usize = 1_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_EVENTS)
    }

    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events: max_events.max(1),
        }
    }

    /// Record a new degradation event. The oldest event is dropped at capacity.
    pub fn record(&mut self, event: DegradationEvent) {
        if self.events.len() == self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
    }

    /// Mark every active degradation of `component` as recovered.
    /// Returns how many were closed.
    pub fn mark_recovered(&mut self, component: &str) -> usize {
        let now = Utc::now();
        let mut closed = 0;
        for tracked in self.events.iter_mut() {
            if tracked.event.component == component
                && tracked.recovery_status == RecoveryStatus::Active
            {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(now);
                closed += 1;
            }
        }
        closed
    }

    pub fn events(&self) -> &VecDeque<TrackedDegradation> {
        &self.events
    }

    /// Active (unrecovered) degradations.
    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.events.iter().any(|t| {
            t.event.component == component && t.recovery_status == RecoveryStatus::Active
        })
    }
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::new()
    }
}
