use serde::{Deserialize, Serialize};

use crate::calendar_adapter::CalendarEvent;

/// Share of history kept by the simulated compression
pub const HISTORY_RETENTION_RATIO: f64 = 0.2;

/// Aggregate counts over the day's events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingAnalytics {
    pub total: usize,
    pub cancelled: usize,
    pub recurring: usize,
}

impl MeetingAnalytics {
    pub fn from_events(events: &[CalendarEvent]) -> Self {
        Self {
            total: events.len(),
            cancelled: events.iter().filter(|e| e.cancelled).count(),
            recurring: events.iter().filter(|e| e.recurring).count(),
        }
    }
}

/// Result of the simulated history summarization. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryCompression {
    pub original: usize,
    pub compressed: usize,
    pub retention_ratio: f64,
}

impl HistoryCompression {
    pub fn reduction_percent(&self) -> f64 {
        (1.0 - self.retention_ratio) * 100.0
    }
}

/// Keeps 20% of the history, at least one entry when there is any.
pub fn compress_history(events: &[CalendarEvent]) -> HistoryCompression {
    let original = events.len();
    let compressed = if original == 0 {
        0
    } else {
        ((original as f64 * HISTORY_RETENTION_RATIO) as usize).max(1)
    };

    HistoryCompression {
        original,
        compressed,
        retention_ratio: HISTORY_RETENTION_RATIO,
    }
}
