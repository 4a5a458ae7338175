//! Client analytics: page views, script errors, load timing.
//!
//! Events are kept in memory and mirrored to `tracing`; there is no remote
//! collector.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::panel::Panel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub name: &'static str,
    pub properties: Value,
}

impl TrackedEvent {
    pub fn page_view(panel: Panel) -> Self {
        Self {
            name: "page_view",
            properties: json!({ "page": panel.id() }),
        }
    }

    pub fn script_error(message: &str, filename: &str, lineno: u32) -> Self {
        Self {
            name: "javascript_error",
            properties: json!({
                "message": message,
                "filename": filename,
                "lineno": lineno,
            }),
        }
    }

    pub fn performance(page_load_time_ms: u64) -> Self {
        Self {
            name: "performance",
            properties: json!({ "page_load_time": page_load_time_ms }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    events: Vec<TrackedEvent>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, event: TrackedEvent) {
        info!(target: "analytics", event = event.name, properties = %event.properties, "analytics event");
        self.events.push(event);
    }

    pub fn events(&self) -> &[TrackedEvent] {
        &self.events
    }

    /// Pages viewed so far, in order.
    pub fn page_views(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.name == "page_view")
            .filter_map(|e| e.properties["page"].as_str())
            .collect()
    }
}
