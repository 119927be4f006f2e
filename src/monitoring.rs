use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::analytics::{HistoryCompression, MeetingAnalytics};
use crate::availability::Slot;
use crate::calendar_adapter::CalendarEvent;
use crate::nl_command_parser::CommandSettings;
use crate::optimizer::ScoredSlot;
use crate::user_learning::Preferences;
use crate::utils::format_slot;

/// One record per pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageReport {
    EventsLoaded { day: NaiveDate, count: usize },
    HistoryCompressed(HistoryCompression),
    Analytics(MeetingAnalytics),
    CommandParsed(CommandSettings),
    CommandRejected { input: String },
    PreferencesLearned(Preferences),
    RiskyHours { hours: Vec<u32> },
    FreeSlots { participant: usize, slots: Vec<Slot> },
    Negotiated { participants: usize, slots: Vec<Slot> },
    SlotScored(ScoredSlot),
    BestSlot { best: Option<ScoredSlot> },
    MeetingCreated { event: CalendarEvent },
    Failed { error: String },
}

impl StageReport {
    pub fn stage(&self) -> &'static str {
        match self {
            StageReport::EventsLoaded { .. } => "events_loaded",
            StageReport::HistoryCompressed(_) => "history_compressed",
            StageReport::Analytics(_) => "analytics",
            StageReport::CommandParsed(_) => "command_parsed",
            StageReport::CommandRejected { .. } => "command_rejected",
            StageReport::PreferencesLearned(_) => "preferences_learned",
            StageReport::RiskyHours { .. } => "risky_hours",
            StageReport::FreeSlots { .. } => "free_slots",
            StageReport::Negotiated { .. } => "negotiated",
            StageReport::SlotScored(_) => "slot_scored",
            StageReport::BestSlot { .. } => "best_slot",
            StageReport::MeetingCreated { .. } => "meeting_created",
            StageReport::Failed { .. } => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            StageReport::EventsLoaded { .. } => "📅",
            StageReport::HistoryCompressed(_) => "📉",
            StageReport::Analytics(_) => "📊",
            StageReport::CommandParsed(_) | StageReport::PreferencesLearned(_) => "🧠",
            StageReport::CommandRejected { .. } | StageReport::Failed { .. } => "❌",
            StageReport::RiskyHours { .. } => "⚠️ ",
            StageReport::FreeSlots { .. } => "🟢",
            StageReport::Negotiated { .. } => "🤝",
            StageReport::SlotScored(_) => "  ",
            StageReport::BestSlot { .. } => "⭐",
            StageReport::MeetingCreated { .. } => "✅",
        }
    }
}

fn join_slots(slots: &[Slot]) -> String {
    if slots.is_empty() {
        return "none".to_string();
    }
    slots.iter().map(format_slot).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageReport::EventsLoaded { day, count } => write!(f, "Loaded {} events for {}", count, day),
            StageReport::HistoryCompressed(c) => write!(
                f,
                "History compressed (simulated): {} -> {} events, {:.0}% reduction",
                c.original,
                c.compressed,
                c.reduction_percent()
            ),
            StageReport::Analytics(a) => write!(
                f,
                "Meeting analytics: total={}, cancelled={}, recurring={}",
                a.total, a.cancelled, a.recurring
            ),
            StageReport::CommandParsed(settings) => write!(f, "Parsed command settings: {}", settings),
            StageReport::CommandRejected { input } => write!(
                f,
                "Unknown command '{}'. Try: schedule meeting tomorrow at 3pm",
                input
            ),
            StageReport::PreferencesLearned(p) => {
                write!(f, "Preferred hour: {} ({:?})", p.preferred_hour, p.source)
            }
            StageReport::RiskyHours { hours } => write!(f, "Risky hours: {:?}", hours),
            StageReport::FreeSlots { participant, slots } => {
                write!(f, "Free slots for participant {}: {}", participant, join_slots(slots))
            }
            StageReport::Negotiated { participants, slots } => write!(
                f,
                "Negotiated slots across {} participants: {}",
                participants,
                join_slots(slots)
            ),
            StageReport::SlotScored(scored) => {
                write!(f, "Slot {} score = {}", format_slot(&scored.slot), scored.score)
            }
            StageReport::BestSlot { best: Some(best) } => {
                write!(f, "Best slot: {} (score {})", best.slot, best.score)
            }
            StageReport::BestSlot { best: None } => write!(f, "No candidate slots; nothing scheduled"),
            StageReport::MeetingCreated { event } => {
                write!(
                    f,
                    "'{}' scheduled successfully at {} ({})",
                    event.title,
                    format_slot(&event.start),
                    event.start.date_naive()
                )
            }
            StageReport::Failed { error } => write!(f, "Scheduling failed: {}", error),
        }
    }
}

/// Destination for stage reports
pub trait ReportSink: Send {
    fn record(&mut self, report: StageReport);
}

/// Forwards every report to the `log` facade
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn record(&mut self, report: StageReport) {
        match &report {
            StageReport::Failed { .. } | StageReport::CommandRejected { .. } => {
                log::warn!("[{}] {}", report.stage(), report)
            }
            StageReport::SlotScored(_) => log::debug!("[{}] {}", report.stage(), report),
            _ => log::info!("[{}] {}", report.stage(), report),
        }
    }
}

/// Human-readable summary on stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn record(&mut self, report: StageReport) {
        println!("{} {}", report.icon(), report);
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn record(&mut self, report: StageReport) {
        let written = serde_json::to_writer(&mut self.writer, &report)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(e) = written {
            log::warn!("Failed to write {} report: {}", report.stage(), e);
        }
    }
}

/// Keeps reports in memory, for tests and embedding callers
#[derive(Debug, Default)]
pub struct MemorySink {
    pub reports: Vec<StageReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.reports.iter().map(StageReport::stage).collect()
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, report: StageReport) {
        self.reports.push(report);
    }
}

/// Sends each report to several sinks
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ReportSink for FanoutSink {
    fn record(&mut self, report: StageReport) {
        if let Some((last, rest)) = self.sinks.split_last_mut() {
            for sink in rest {
                sink.record(report.clone());
            }
            last.record(report);
        }
    }
}
