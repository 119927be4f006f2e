use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::MeetingConfig;
use crate::error::SchedulerError;
use crate::utils::day_at;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub cancelled: bool,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            start,
            end,
            recurring: false,
            cancelled: false,
        }
    }

    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }
}

/// Supplies the events of the scheduling day.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn get_events(&self) -> Result<Vec<CalendarEvent>>;
}

/// Commits a chosen slot to a calendar.
#[async_trait]
pub trait EventCreator: Send + Sync {
    async fn create(&self, slot: DateTime<Utc>) -> Result<CalendarEvent>;
}

fn meeting_event(meeting: &MeetingConfig, slot: DateTime<Utc>) -> CalendarEvent {
    let mut event = CalendarEvent::new(
        meeting.title.clone(),
        slot,
        slot + Duration::minutes(i64::from(meeting.duration_minutes)),
    );
    event.id = Some(Uuid::new_v4().to_string());
    event
}

/// The built-in demo day: a recurring standup, a cancelled client call and a
/// recurring team sync.
pub struct FixtureCalendar {
    day: NaiveDate,
}

impl FixtureCalendar {
    pub fn new() -> Self {
        Self {
            day: Self::default_day(),
        }
    }

    pub fn default_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap_or_default()
    }

    pub fn on(day: NaiveDate) -> Self {
        Self { day }
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        vec![
            CalendarEvent::new("Standup", day_at(self.day, 10, 0), day_at(self.day, 10, 30)).recurring(),
            CalendarEvent::new("Client Call", day_at(self.day, 14, 0), day_at(self.day, 15, 0)).cancelled(),
            CalendarEvent::new("Team Sync", day_at(self.day, 16, 0), day_at(self.day, 16, 30)).recurring(),
        ]
    }
}

impl Default for FixtureCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for FixtureCalendar {
    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        Ok(self.events())
    }
}

/// Reads events from a JSON (`.json`) or YAML (`.yaml`/`.yml`) file holding a
/// list of events.
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Vec<CalendarEvent>> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let events: Vec<CalendarEvent> = match extension.as_deref() {
            Some("json") => serde_json::from_str(contents).map_err(|e| {
                SchedulerError::EventSource(format!("Failed to parse JSON events from {}: {}", path.display(), e))
            })?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(contents).map_err(|e| {
                SchedulerError::EventSource(format!("Failed to parse YAML events from {}: {}", path.display(), e))
            })?,
            _ => {
                return Err(SchedulerError::EventSource(format!(
                    "Unsupported event file '{}': expected a .json, .yaml or .yml extension",
                    path.display()
                ))
                .into())
            }
        };
        Ok(events)
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SchedulerError::EventSource(format!("Failed to read event file {}: {}", self.path.display(), e))
        })?;
        let events = Self::parse(&self.path, &contents)?;
        log::debug!("Loaded {} events from {}", events.len(), self.path.display());
        Ok(events)
    }
}

/// Logs the scheduled meeting without writing to any calendar. The
/// `MeetingCreated` stage report carries the result to the user.
pub struct ConsoleEventCreator {
    meeting: MeetingConfig,
}

impl ConsoleEventCreator {
    pub fn new(meeting: MeetingConfig) -> Self {
        Self { meeting }
    }
}

#[async_trait]
impl EventCreator for ConsoleEventCreator {
    async fn create(&self, slot: DateTime<Utc>) -> Result<CalendarEvent> {
        let event = meeting_event(&self.meeting, slot);
        log::info!(
            "Created '{}' at {} for {} minutes",
            event.title,
            slot,
            self.meeting.duration_minutes
        );
        Ok(event)
    }
}

/// In-memory calendar acting as both source and creator.
#[derive(Clone)]
pub struct MemoryCalendar {
    events: Vec<CalendarEvent>,
    created: Arc<RwLock<Vec<CalendarEvent>>>,
    meeting: MeetingConfig,
}

impl MemoryCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            created: Arc::new(RwLock::new(Vec::new())),
            meeting: MeetingConfig::default(),
        }
    }

    pub fn with_meeting(mut self, meeting: MeetingConfig) -> Self {
        self.meeting = meeting;
        self
    }

    pub async fn created(&self) -> Vec<CalendarEvent> {
        self.created.read().await.clone()
    }
}

#[async_trait]
impl EventSource for MemoryCalendar {
    async fn get_events(&self) -> Result<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }
}

#[async_trait]
impl EventCreator for MemoryCalendar {
    async fn create(&self, slot: DateTime<Utc>) -> Result<CalendarEvent> {
        let event = meeting_event(&self.meeting, slot);
        self.created.write().await.push(event.clone());
        Ok(event)
    }
}
