use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar_adapter::CalendarEvent;
use crate::error::{SchedulerError, SchedulerResult};
use crate::nl_command_parser::CommandSettings;

/// Hours of day at which cancelled events started
pub type RiskySet = BTreeSet<u32>;

/// Where a learned preference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceSource {
    Explicit,
    History,
}

/// Hour of day the optimizer should favor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub preferred_hour: u32,
    pub source: PreferenceSource,
}

/// Use the command's explicit hour, otherwise the most frequent event start
/// hour. Ties go to the earliest hour. An explicit hour outside 0..=23 is a
/// configuration error of the interpreter that produced it.
pub fn learn_preferences(
    events: &[CalendarEvent],
    settings: &CommandSettings,
) -> SchedulerResult<Preferences> {
    if let Some(hour) = settings.preferred_hour {
        if hour > 23 {
            return Err(SchedulerError::Configuration(format!(
                "explicit preferred hour {} is not an hour of the day",
                hour
            )));
        }
        return Ok(Preferences {
            preferred_hour: hour,
            source: PreferenceSource::Explicit,
        });
    }

    let mut hour_counts: BTreeMap<u32, usize> = BTreeMap::new();
    for event in events {
        *hour_counts.entry(event.start.hour()).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending hour order, so keeping only strictly
    // larger counts leaves the smallest hour among ties.
    let mut best: Option<(u32, usize)> = None;
    for (&hour, &count) in &hour_counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((hour, count));
        }
    }

    match best {
        Some((hour, count)) => {
            log::debug!("Learned preferred hour {} from {} of {} events", hour, count, events.len());
            Ok(Preferences {
                preferred_hour: hour,
                source: PreferenceSource::History,
            })
        }
        None => Err(SchedulerError::InsufficientData(
            "no events to learn a preferred hour from and no hour given in the command".to_string(),
        )),
    }
}

/// Distinct start hours of cancelled events, recurring or not
pub fn predict_cancellations(events: &[CalendarEvent]) -> RiskySet {
    events
        .iter()
        .filter(|event| event.cancelled)
        .map(|event| event.start.hour())
        .collect()
}
