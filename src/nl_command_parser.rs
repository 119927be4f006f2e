use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword a command must contain to trigger a scheduling run
pub const SCHEDULE_KEYWORD: &str = "schedule";

const HOUR_PATTERN: &str = r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Structured settings extracted from a free-text command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Explicit hour of day in 0..=23
    pub preferred_hour: Option<u32>,
    pub avoid_morning: bool,
    pub priority: Priority,
}

impl fmt::Display for CommandSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self
            .preferred_hour
            .map(|h| h.to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "preferred_hour={}, avoid_morning={}, priority={}",
            hour, self.avoid_morning, self.priority
        )
    }
}

/// Turns command text into settings. Implementations never fail: anything
/// they cannot understand degrades to defaults.
pub trait CommandInterpreter: Send + Sync {
    fn parse(&self, text: &str) -> CommandSettings;
}

/// Whether the text asks for a scheduling run at all
pub fn is_schedule_command(text: &str) -> bool {
    text.to_lowercase().contains(SCHEDULE_KEYWORD)
}

/// Best-effort keyword and hour-token extractor
pub struct RegexCommandInterpreter {
    hour_re: Regex,
}

impl RegexCommandInterpreter {
    pub fn new() -> Self {
        Self {
            hour_re: Regex::new(HOUR_PATTERN).expect("hour pattern is a valid regex"),
        }
    }

    /// First hour token in the text that names a real hour of day
    fn extract_hour(&self, text: &str) -> Option<u32> {
        self.hour_re.captures_iter(text).find_map(|caps| {
            let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
            if let Some(minutes) = caps.get(2) {
                let minutes: u32 = minutes.as_str().parse().ok()?;
                if minutes > 59 {
                    return None;
                }
            }
            match caps.get(3).map(|m| m.as_str()) {
                Some(meridiem) => to_24_hour(hour, meridiem == "pm"),
                None if hour <= 23 => Some(hour),
                None => None,
            }
        })
    }
}

fn to_24_hour(hour: u32, pm: bool) -> Option<u32> {
    match (hour, pm) {
        (1..=11, false) => Some(hour),
        (12, false) => Some(0),
        (1..=11, true) => Some(hour + 12),
        (12, true) => Some(12),
        _ => None,
    }
}

impl Default for RegexCommandInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandInterpreter for RegexCommandInterpreter {
    fn parse(&self, text: &str) -> CommandSettings {
        let text = text.to_lowercase();

        let settings = CommandSettings {
            preferred_hour: self.extract_hour(&text),
            // also covers "avoid mornings"
            avoid_morning: text.contains("avoid morning"),
            priority: if text.contains("high priority") {
                Priority::High
            } else {
                Priority::Normal
            },
        };

        log::debug!("Parsed '{}' into {}", text, settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CommandSettings {
        RegexCommandInterpreter::new().parse(text)
    }

    #[test]
    fn test_pm_hour() {
        let settings = parse("schedule meeting at 3pm");
        assert_eq!(settings.preferred_hour, Some(15));
        assert!(!settings.avoid_morning);
        assert_eq!(settings.priority, Priority::Normal);
    }

    #[test]
    fn test_am_hour_with_space() {
        assert_eq!(parse("schedule standup 9 am").preferred_hour, Some(9));
    }

    #[test]
    fn test_twelve_am_and_pm() {
        assert_eq!(parse("schedule at 12am").preferred_hour, Some(0));
        assert_eq!(parse("schedule at 12pm").preferred_hour, Some(12));
    }

    #[test]
    fn test_24_hour_literal() {
        assert_eq!(parse("schedule review at 16").preferred_hour, Some(16));
        assert_eq!(parse("schedule review at 13:30").preferred_hour, Some(13));
        assert_eq!(parse("schedule review at 0").preferred_hour, Some(0));
    }

    #[test]
    fn test_out_of_range_numbers_are_skipped() {
        assert_eq!(parse("schedule at 25").preferred_hour, None);
        assert_eq!(parse("schedule at 13pm").preferred_hour, None);
        assert_eq!(parse("schedule a 30 minute sync at 2pm").preferred_hour, Some(14));
        assert_eq!(parse("schedule on 2026").preferred_hour, None);
    }

    #[test]
    fn test_uppercase_input() {
        let settings = parse("Schedule Meeting At 4PM, Avoid Mornings, HIGH PRIORITY");
        assert_eq!(settings.preferred_hour, Some(16));
        assert!(settings.avoid_morning);
        assert_eq!(settings.priority, Priority::High);
    }

    #[test]
    fn test_avoid_mornings_and_priority() {
        let settings = parse("schedule meeting, avoid mornings, high priority");
        assert_eq!(settings.preferred_hour, None);
        assert!(settings.avoid_morning);
        assert_eq!(settings.priority, Priority::High);

        assert!(parse("schedule something, avoid morning").avoid_morning);
    }

    #[test]
    fn test_unrecognized_text_yields_defaults() {
        assert_eq!(parse("whatever you think is best"), CommandSettings::default());
        assert_eq!(parse(""), CommandSettings::default());
    }

    #[test]
    fn test_is_schedule_command() {
        assert!(is_schedule_command("schedule meeting tomorrow at 3pm"));
        assert!(is_schedule_command("please SCHEDULE a sync"));
        assert!(!is_schedule_command("remind me tomorrow"));
    }

    #[test]
    fn test_settings_display() {
        let settings = CommandSettings {
            preferred_hour: Some(15),
            avoid_morning: true,
            priority: Priority::High,
        };
        assert_eq!(settings.to_string(), "preferred_hour=15, avoid_morning=true, priority=high");
        assert_eq!(
            CommandSettings::default().to_string(),
            "preferred_hour=none, avoid_morning=false, priority=normal"
        );
    }
}
