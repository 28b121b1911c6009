use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters maintained by the navigator for every processed input.
#[derive(Debug, Default, Clone)]
pub struct NavMetrics {
    inputs: u64,
    focus_moves: u64,
    boundary_hits: u64,
    transitions: u64,
    activations: u64,
    suppressed: u64,
    stale_registrations: u64,
}

impl NavMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_input(&mut self) {
        self.inputs = self.inputs.saturating_add(1);
    }

    pub fn record_focus_move(&mut self) {
        self.focus_moves = self.focus_moves.saturating_add(1);
    }

    pub fn record_boundary(&mut self) {
        self.boundary_hits = self.boundary_hits.saturating_add(1);
    }

    pub fn record_transition(&mut self) {
        self.transitions = self.transitions.saturating_add(1);
    }

    pub fn record_activation(&mut self) {
        self.activations = self.activations.saturating_add(1);
    }

    pub fn record_suppressed(&mut self) {
        self.suppressed = self.suppressed.saturating_add(1);
    }

    pub fn record_stale_registration(&mut self) {
        self.stale_registrations = self.stale_registrations.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            inputs: self.inputs,
            focus_moves: self.focus_moves,
            boundary_hits: self.boundary_hits,
            transitions: self.transitions,
            activations: self.activations,
            suppressed: self.suppressed,
            stale_registrations: self.stale_registrations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub inputs: u64,
    pub focus_moves: u64,
    pub boundary_hits: u64,
    pub transitions: u64,
    pub activations: u64,
    pub suppressed: u64,
    pub stale_registrations: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "nav_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("inputs".to_string(), json!(self.inputs));
        map.insert("focus_moves".to_string(), json!(self.focus_moves));
        map.insert("boundary_hits".to_string(), json!(self.boundary_hits));
        map.insert("transitions".to_string(), json!(self.transitions));
        map.insert("activations".to_string(), json!(self.activations));
        map.insert("suppressed".to_string(), json!(self.suppressed));
        map.insert(
            "stale_registrations".to_string(),
            json!(self.stale_registrations),
        );
        map
    }
}
