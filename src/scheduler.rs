use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{compress_history, HistoryCompression, MeetingAnalytics};
use crate::availability::{find_free_slots, negotiate_slots, Slot};
use crate::calendar_adapter::{CalendarEvent, EventCreator, EventSource};
use crate::config::Config;
use crate::error::SchedulerResult;
use crate::monitoring::{ReportSink, StageReport};
use crate::nl_command_parser::{is_schedule_command, CommandInterpreter, CommandSettings, RegexCommandInterpreter};
use crate::optimizer::{pick_best, rank_slots, ScoredSlot};
use crate::user_learning::{learn_preferences, predict_cancellations, Preferences, RiskySet};

/// Everything one scheduling pass derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingOutcome {
    pub day: NaiveDate,
    pub settings: CommandSettings,
    pub compression: HistoryCompression,
    pub analytics: MeetingAnalytics,
    pub preferences: Preferences,
    pub risky_hours: RiskySet,
    /// Free slots per participant, organizer first
    pub free_slots: Vec<Vec<Slot>>,
    pub negotiated_slots: Vec<Slot>,
    pub scored: Vec<ScoredSlot>,
    pub best: Option<ScoredSlot>,
}

impl SchedulingOutcome {
    pub fn best_slot(&self) -> Option<Slot> {
        self.best.as_ref().map(|best| best.slot)
    }
}

/// Scheduling day: configured day, else the earliest event's date, else today
pub fn resolve_day(config: &Config, events: &[CalendarEvent]) -> NaiveDate {
    config
        .general
        .day
        .or_else(|| events.iter().map(|e| e.start).min().map(|start| start.date_naive()))
        .unwrap_or_else(|| Utc::now().date_naive())
}

/// Run the whole pipeline over already-fetched events.
///
/// `other_participants` holds the events of everyone besides the organizer.
/// When it is empty the organizer negotiates with a copy of their own free
/// slots. No I/O happens here apart from what `sink` does.
pub fn schedule(
    events: &[CalendarEvent],
    other_participants: &[Vec<CalendarEvent>],
    settings: &CommandSettings,
    config: &Config,
    sink: &mut dyn ReportSink,
) -> SchedulerResult<SchedulingOutcome> {
    let result = run_pipeline(events, other_participants, settings, config, sink);
    if let Err(e) = &result {
        sink.record(StageReport::Failed { error: e.to_string() });
    }
    result
}

fn run_pipeline(
    events: &[CalendarEvent],
    other_participants: &[Vec<CalendarEvent>],
    settings: &CommandSettings,
    config: &Config,
    sink: &mut dyn ReportSink,
) -> SchedulerResult<SchedulingOutcome> {
    config.validate()?;

    let day = resolve_day(config, events);
    sink.record(StageReport::EventsLoaded {
        day,
        count: events.len(),
    });

    let compression = compress_history(events);
    sink.record(StageReport::HistoryCompressed(compression));

    let analytics = MeetingAnalytics::from_events(events);
    sink.record(StageReport::Analytics(analytics));

    let preferences = learn_preferences(events, settings)?;
    sink.record(StageReport::PreferencesLearned(preferences));

    let risky_hours = predict_cancellations(events);
    sink.record(StageReport::RiskyHours {
        hours: risky_hours.iter().copied().collect(),
    });

    let organizer = find_free_slots(events, day, settings, &config.availability);
    let mut free_slots = vec![organizer.clone()];
    if other_participants.is_empty() {
        free_slots.push(organizer);
    } else {
        for participant_events in other_participants {
            free_slots.push(find_free_slots(participant_events, day, settings, &config.availability));
        }
    }
    for (index, slots) in free_slots.iter().enumerate() {
        sink.record(StageReport::FreeSlots {
            participant: index + 1,
            slots: slots.clone(),
        });
    }

    let negotiated_slots = negotiate_slots(&free_slots)?;
    sink.record(StageReport::Negotiated {
        participants: free_slots.len(),
        slots: negotiated_slots.clone(),
    });

    // negotiation output is a set; score in time order so ties are reproducible
    let mut ordered = negotiated_slots.clone();
    ordered.sort();
    let scored = rank_slots(&ordered, &preferences, &risky_hours, settings, &config.scoring);
    for candidate in &scored {
        sink.record(StageReport::SlotScored(candidate.clone()));
    }

    let best = pick_best(scored.clone());
    sink.record(StageReport::BestSlot { best: best.clone() });

    Ok(SchedulingOutcome {
        day,
        settings: settings.clone(),
        compression,
        analytics,
        preferences,
        risky_hours,
        free_slots,
        negotiated_slots,
        scored,
        best,
    })
}

/// Result of handling one command
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The text did not ask for scheduling
    Rejected,
    /// No common slot; nothing was created
    NoSlot(SchedulingOutcome),
    Scheduled {
        outcome: SchedulingOutcome,
        event: CalendarEvent,
    },
}

/// Wires an event source, a command interpreter and an event creator around
/// [`schedule`].
pub struct SchedulingRun {
    config: Config,
    source: Box<dyn EventSource>,
    creator: Box<dyn EventCreator>,
    interpreter: Box<dyn CommandInterpreter>,
    participants: Vec<Box<dyn EventSource>>,
}

impl SchedulingRun {
    pub fn new(config: Config, source: Box<dyn EventSource>, creator: Box<dyn EventCreator>) -> Self {
        Self {
            config,
            source,
            creator,
            interpreter: Box::new(RegexCommandInterpreter::new()),
            participants: Vec::new(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: Box<dyn CommandInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_participant(mut self, participant: Box<dyn EventSource>) -> Self {
        self.participants.push(participant);
        self
    }

    /// Handle one free-text command end to end
    pub async fn execute(&self, command: &str, sink: &mut dyn ReportSink) -> Result<RunOutcome> {
        let command = command.trim();
        if !is_schedule_command(command) {
            sink.record(StageReport::CommandRejected {
                input: command.to_string(),
            });
            return Ok(RunOutcome::Rejected);
        }

        let settings = self.interpreter.parse(command);
        sink.record(StageReport::CommandParsed(settings.clone()));

        let events = self
            .source
            .get_events()
            .await
            .context("Failed to load the organizer's events")?;

        let mut other_participants = Vec::with_capacity(self.participants.len());
        for (index, participant) in self.participants.iter().enumerate() {
            let participant_events = participant
                .get_events()
                .await
                .with_context(|| format!("Failed to load events for participant {}", index + 2))?;
            other_participants.push(participant_events);
        }

        let outcome = schedule(&events, &other_participants, &settings, &self.config, sink)?;

        match outcome.best_slot() {
            Some(slot) => {
                let event = self
                    .creator
                    .create(slot)
                    .await
                    .with_context(|| format!("Failed to create meeting at {}", slot))?;
                sink.record(StageReport::MeetingCreated { event: event.clone() });
                Ok(RunOutcome::Scheduled { outcome, event })
            }
            None => {
                log::info!("No candidate slots on {}; skipping event creation", outcome.day);
                Ok(RunOutcome::NoSlot(outcome))
            }
        }
    }
}
