//! Transient notifications.
//!
//! Every toast disappears [`TOAST_TTL`] after it was shown unless dismissed
//! earlier. The collection is a value type: operations return new
//! collections so snapshots stay immutable.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            Severity::Success => "#10b981",
            Severity::Error => "#ef4444",
            Severity::Warning => "#f59e0b",
            Severity::Info => "#667eea",
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub severity: Severity,
    pub message: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn expires_at(&self) -> Instant {
        self.shown_at + TOAST_TTL
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: ToastId,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast. Returns the grown collection and the new toast's id.
    #[must_use]
    pub fn push(&self, severity: Severity, message: impl Into<String>, now: Instant) -> (Self, ToastId) {
        let id = self.next_id;
        let mut items = self.items.clone();
        items.push(Toast {
            id,
            severity,
            message: message.into(),
            shown_at: now,
        });
        (
            Self {
                items,
                next_id: id + 1,
            },
            id,
        )
    }

    /// Remove toast `id`. Unknown ids are ignored.
    #[must_use]
    pub fn dismiss(&self, id: ToastId) -> Self {
        self.retain(|t| t.id != id)
    }

    /// Drop toasts whose time-to-live has elapsed at `now`.
    #[must_use]
    pub fn expire(&self, now: Instant) -> Self {
        self.retain(|t| t.expires_at() > now)
    }

    pub fn visible(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recent toast, if any.
    pub fn latest(&self) -> Option<&Toast> {
        self.items.last()
    }

    fn retain(&self, keep: impl Fn(&Toast) -> bool) -> Self {
        Self {
            items: self.items.iter().filter(|t| keep(t)).cloned().collect(),
            next_id: self.next_id,
        }
    }
}
