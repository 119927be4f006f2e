use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use std::collections::HashSet;

use crate::calendar_adapter::CalendarEvent;
use crate::config::AvailabilityConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::nl_command_parser::CommandSettings;
use crate::utils::day_at;

/// Candidate meeting start time
pub type Slot = DateTime<Utc>;

/// Start times in the gaps between buffer-padded events on `day`.
///
/// A cursor walks from `work_start` through the events in start order. Each
/// gap the cursor sits in before an event's padded start yields one candidate,
/// then the cursor jumps past the event's padded end. Whatever remains of the
/// work day after the last event yields a final candidate. The cursor never
/// moves backwards, so overlapping or nested events are handled.
pub fn find_free_slots(
    events: &[CalendarEvent],
    day: NaiveDate,
    settings: &CommandSettings,
    config: &AvailabilityConfig,
) -> Vec<Slot> {
    let buffer = Duration::minutes(i64::from(config.buffer_minutes));
    let work_end = day_at(day, config.work_end, 0);

    let mut blocking: Vec<&CalendarEvent> = events
        .iter()
        .filter(|event| config.cancelled_events_block || !event.cancelled)
        .collect();
    blocking.sort_by_key(|event| event.start);

    let mut free = Vec::new();
    let mut cursor = day_at(day, config.work_start, 0);

    for event in blocking {
        if cursor < event.start - buffer && cursor < work_end {
            free.push(cursor);
        }
        cursor = cursor.max(event.end + buffer);
    }

    if cursor < work_end {
        free.push(cursor);
    }

    if settings.avoid_morning {
        free.retain(|slot| slot.hour() >= config.avoid_morning_before_hour);
    }

    log::debug!("Found {} free slots on {}", free.len(), day);
    free
}

/// Slots every participant has free.
///
/// The result follows the first participant's order with duplicates removed;
/// callers should treat it as a set.
pub fn negotiate_slots(participants: &[Vec<Slot>]) -> SchedulerResult<Vec<Slot>> {
    let (first, others) = participants.split_first().ok_or_else(|| {
        SchedulerError::Configuration("no participants supplied for negotiation".to_string())
    })?;

    let others: Vec<HashSet<&Slot>> = others.iter().map(|slots| slots.iter().collect()).collect();
    let mut seen = HashSet::new();

    let common: Vec<Slot> = first
        .iter()
        .filter(|slot| others.iter().all(|set| set.contains(slot)))
        .filter(|slot| seen.insert(**slot))
        .copied()
        .collect();

    log::debug!(
        "Negotiated {} common slots across {} participants",
        common.len(),
        participants.len()
    );
    Ok(common)
}
