//! Meeting slot finder.
//!
//! Given one day of calendar events and a free-text command such as
//! "schedule meeting at 3pm, high priority", slotwise:
//! - derives free start times between buffer-padded events
//! - intersects the free times of every participant
//! - scores the common slots on preference, cancellation risk, time of day
//!   and priority, and books the best one
//!
//! # Example
//!
//! ```rust,no_run
//! use slotwise::calendar_adapter::{FixtureCalendar, MemoryCalendar};
//! use slotwise::config::Config;
//! use slotwise::monitoring::LogSink;
//! use slotwise::scheduler::SchedulingRun;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let calendar = MemoryCalendar::new(FixtureCalendar::new().events());
//!     let run = SchedulingRun::new(
//!         Config::default(),
//!         Box::new(calendar.clone()),
//!         Box::new(calendar.clone()),
//!     );
//!     run.execute("schedule meeting at 3pm", &mut LogSink).await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod availability;
pub mod calendar_adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod nl_command_parser;
pub mod optimizer;
pub mod router;
pub mod scheduler;
pub mod user_learning;
pub mod utils;

pub use availability::{find_free_slots, negotiate_slots, Slot};
pub use calendar_adapter::{CalendarEvent, EventCreator, EventSource};
pub use error::{SchedulerError, SchedulerResult};
pub use nl_command_parser::{CommandInterpreter, CommandSettings, Priority, RegexCommandInterpreter};
pub use optimizer::{choose_best_slot, score_slot, ScoredSlot};
pub use scheduler::{schedule, RunOutcome, SchedulingOutcome, SchedulingRun};
pub use user_learning::{learn_preferences, predict_cancellations, Preferences, RiskySet};
