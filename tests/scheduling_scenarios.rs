use chrono::{DateTime, Utc};
use slotwise::calendar_adapter::{FileEventSource, FixtureCalendar, MemoryCalendar};
use slotwise::config::Config;
use slotwise::monitoring::{MemorySink, StageReport};
use slotwise::utils::day_at;
use slotwise::{
    negotiate_slots, schedule, CommandInterpreter, Priority, RegexCommandInterpreter, RiskySet,
    RunOutcome, SchedulingRun,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    day_at(FixtureCalendar::default_day(), hour, minute)
}

fn fixture_run(calendar: &MemoryCalendar) -> SchedulingRun {
    SchedulingRun::new(
        Config::default(),
        Box::new(calendar.clone()),
        Box::new(calendar.clone()),
    )
}

#[tokio::test]
async fn three_pm_request_books_the_quarter_past_slot() {
    let calendar = MemoryCalendar::new(FixtureCalendar::new().events());
    let mut sink = MemorySink::new();

    let outcome = fixture_run(&calendar)
        .execute("schedule meeting at 3pm", &mut sink)
        .await
        .unwrap();

    let RunOutcome::Scheduled { outcome, event } = outcome else {
        panic!("expected a meeting to be scheduled");
    };
    assert_eq!(outcome.free_slots[0], vec![at(9, 0), at(10, 45), at(15, 15), at(16, 45)]);
    assert_eq!(outcome.risky_hours, RiskySet::from([14]));
    assert_eq!(outcome.preferences.preferred_hour, 15);
    assert!(!outcome.settings.avoid_morning);
    assert_eq!(outcome.settings.priority, Priority::Normal);
    assert_eq!(event.start, at(15, 15));
    assert_eq!(calendar.created().await, vec![event]);
}

#[tokio::test]
async fn avoid_mornings_with_high_priority() {
    let calendar = MemoryCalendar::new(FixtureCalendar::new().events());
    let mut sink = MemorySink::new();

    let outcome = fixture_run(&calendar)
        .execute("schedule meeting, avoid mornings, high priority", &mut sink)
        .await
        .unwrap();

    let RunOutcome::Scheduled { outcome, event } = outcome else {
        panic!("expected a meeting to be scheduled");
    };
    assert_eq!(outcome.negotiated_slots, vec![at(15, 15), at(16, 45)]);
    assert!(outcome.scored.iter().all(|s| s.breakdown.priority == 5));
    assert!(outcome.scored.iter().all(|s| s.breakdown.morning_band == 0));
    // 10:00, 14:00 and 16:00 each start one event; the earliest hour wins
    assert_eq!(outcome.preferences.preferred_hour, 10);
    // both candidates score 5, so the earlier one is kept
    assert_eq!(event.start, at(15, 15));
}

#[tokio::test]
async fn unknown_command_never_reaches_the_calendar() {
    let calendar = MemoryCalendar::new(FixtureCalendar::new().events());
    let mut sink = MemorySink::new();

    let outcome = fixture_run(&calendar)
        .execute("remind me tomorrow", &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Rejected);
    assert!(calendar.created().await.is_empty());
    assert!(matches!(
        sink.reports.as_slice(),
        [StageReport::CommandRejected { input }] if input == "remind me tomorrow"
    ));
}

#[tokio::test]
async fn empty_calendar_without_an_hour_aborts_the_run() {
    let calendar = MemoryCalendar::new(Vec::new());
    let mut sink = MemorySink::new();

    let err = fixture_run(&calendar)
        .execute("schedule a sync", &mut sink)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Insufficient data"));
    assert!(calendar.created().await.is_empty());
    assert_eq!(sink.stages().last(), Some(&"failed"));
}

#[tokio::test]
async fn participant_files_are_negotiated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colleague.yaml");
    std::fs::write(
        &path,
        "- title: Lunch\n  start: 2026-02-10T12:00:00Z\n  end: 2026-02-10T13:00:00Z\n\
         - title: Team Sync\n  start: 2026-02-10T16:00:00Z\n  end: 2026-02-10T16:30:00Z\n  recurring: true\n",
    )
    .unwrap();

    let calendar = MemoryCalendar::new(FixtureCalendar::new().events());
    let run = fixture_run(&calendar).with_participant(Box::new(FileEventSource::new(&path)));

    let outcome = run.execute("schedule review at 9am", &mut MemorySink::new()).await.unwrap();

    let RunOutcome::Scheduled { outcome, event } = outcome else {
        panic!("expected a meeting to be scheduled");
    };
    assert_eq!(outcome.free_slots[1], vec![at(9, 0), at(13, 15), at(16, 45)]);
    assert_eq!(outcome.negotiated_slots, vec![at(9, 0), at(16, 45)]);
    assert_eq!(event.start, at(9, 0));
}

#[test]
fn pure_pipeline_matches_the_async_run() {
    let settings = RegexCommandInterpreter::new().parse("schedule meeting at 3pm");
    let outcome = schedule(
        &FixtureCalendar::new().events(),
        &[],
        &settings,
        &Config::default(),
        &mut MemorySink::new(),
    )
    .unwrap();

    assert_eq!(outcome.best_slot(), Some(at(15, 15)));
}

#[test]
fn self_negotiation_is_idempotent() {
    let slots = vec![at(9, 0), at(10, 45), at(15, 15), at(16, 45)];
    let common = negotiate_slots(&[slots.clone(), slots.clone()]).unwrap();
    assert_eq!(common, slots);
}
