use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Counters kept by a template model across its lifetime.
#[derive(Debug, Default, Clone)]
pub struct EditMetrics {
    applied: u64,
    rejected: u64,
    widgets_added: u64,
    widgets_removed: u64,
    conversions: u64,
    saves: u64,
}

impl EditMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_applied(&mut self) {
        self.applied = self.applied.saturating_add(1);
    }

    pub fn record_rejected(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub fn record_widget_added(&mut self) {
        self.widgets_added = self.widgets_added.saturating_add(1);
    }

    pub fn record_widgets_removed(&mut self, count: usize) {
        if count > 0 {
            self.widgets_removed = self.widgets_removed.saturating_add(count as u64);
        }
    }

    pub fn record_conversion(&mut self) {
        self.conversions = self.conversions.saturating_add(1);
    }

    pub fn record_save(&mut self) {
        self.saves = self.saves.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> EditMetricSnapshot {
        EditMetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            applied: self.applied,
            rejected: self.rejected,
            widgets_added: self.widgets_added,
            widgets_removed: self.widgets_removed,
            conversions: self.conversions,
            saves: self.saves,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditMetricSnapshot {
    pub uptime_ms: u64,
    pub applied: u64,
    pub rejected: u64,
    pub widgets_added: u64,
    pub widgets_removed: u64,
    pub conversions: u64,
    pub saves: u64,
}

impl EditMetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "edit_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("applied".to_string(), json!(self.applied));
        map.insert("rejected".to_string(), json!(self.rejected));
        map.insert("widgets_added".to_string(), json!(self.widgets_added));
        map.insert("widgets_removed".to_string(), json!(self.widgets_removed));
        map.insert("conversions".to_string(), json!(self.conversions));
        map.insert("saves".to_string(), json!(self.saves));
        map
    }
}
