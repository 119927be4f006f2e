use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::analytics::MeetingAnalytics;
use crate::calendar_adapter::{ConsoleEventCreator, EventSource, FileEventSource, FixtureCalendar};
use crate::cli::{Cli, Commands, ConfigArgs, EventsArgs, RunArgs};
use crate::config::Config;
use crate::monitoring::{ConsoleSink, FanoutSink, JsonLinesSink, LogSink, ReportSink};
use crate::nl_command_parser::is_schedule_command;
use crate::scheduler::{resolve_day, RunOutcome, SchedulingRun};
use crate::utils::format_slot;

pub async fn route_command(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Some(Commands::Run(run_args)) => handle_run_command(run_args, config).await,
        Some(Commands::Events(events_args)) => handle_events_command(events_args, config).await,
        Some(Commands::Config(config_args)) => handle_config_command(config_args, config),
        None => handle_interactive(config).await,
    }
}

fn event_source(path: Option<PathBuf>) -> Box<dyn EventSource> {
    match path {
        Some(path) => Box::new(FileEventSource::new(path)),
        None => Box::new(FixtureCalendar::new()),
    }
}

async fn handle_run_command(args: RunArgs, config: Config) -> Result<()> {
    let command = args.text.join(" ");

    if args.json {
        // stdout carries nothing but report lines
        run_scheduler(&command, &args, config, JsonLinesSink::new(io::stdout())).await?;
        return Ok(());
    }

    if is_schedule_command(command.trim()) {
        println!("\n🚀 Slotwise scheduler started\n");
    }
    match run_scheduler(&command, &args, config, ConsoleSink).await? {
        RunOutcome::Rejected => {}
        RunOutcome::NoSlot(_) => println!("\nScheduling complete: no meeting was scheduled."),
        RunOutcome::Scheduled { .. } => println!("\n✅ Scheduling complete!"),
    }
    Ok(())
}

/// Build the run from the CLI arguments and execute it, reporting to the
/// log and to `output`.
async fn run_scheduler(
    command: &str,
    args: &RunArgs,
    config: Config,
    output: impl ReportSink + 'static,
) -> Result<RunOutcome> {
    let creator = ConsoleEventCreator::new(config.meeting.clone());

    let mut run = SchedulingRun::new(config, event_source(args.events.clone()), Box::new(creator));
    for participant in &args.participants {
        run = run.with_participant(Box::new(FileEventSource::new(participant)));
    }

    let mut sink = FanoutSink::new().with(LogSink).with(output);
    run.execute(command, &mut sink).await
}

async fn handle_interactive(config: Config) -> Result<()> {
    println!("💬 Enter a scheduling command (e.g. \"schedule meeting at 3pm\"):");
    print!(">>> ");
    io::stdout().flush()?;

    let mut input = String::new();
    let bytes_read = io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read command from stdin")?;

    if bytes_read == 0 {
        println!();
        return Ok(());
    }

    let args = RunArgs {
        text: vec![input.trim().to_string()],
        ..Default::default()
    };
    handle_run_command(args, config).await
}

async fn handle_events_command(args: EventsArgs, config: Config) -> Result<()> {
    let events = event_source(args.events).get_events().await?;
    let day = resolve_day(&config, &events);

    println!("📅 Events for {}:", day);
    if events.is_empty() {
        println!("  (none)");
    }
    for event in &events {
        let mut flags = Vec::new();
        if event.recurring {
            flags.push("recurring");
        }
        if event.cancelled {
            flags.push("cancelled");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {}-{}  {}{}",
            format_slot(&event.start),
            format_slot(&event.end),
            event.title,
            flags
        );
    }

    let analytics = MeetingAnalytics::from_events(&events);
    println!(
        "\n📊 Total: {}  Cancelled: {}  Recurring: {}",
        analytics.total, analytics.cancelled, analytics.recurring
    );
    Ok(())
}

fn handle_config_command(args: ConfigArgs, config: Config) -> Result<()> {
    if args.init {
        Config::create_sample_config()?;
    }

    if let Some(assignment) = args.set {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;
        let path = Config::get_config_path();
        let mut stored = Config::load_from_path(&path)?.unwrap_or_default();
        stored.set_value(key.trim(), value.trim())?;
        stored.save_to(&path)?;
        println!("Set {} = {} in {}", key.trim(), value.trim(), path.display());
    }

    if args.keys {
        for key in Config::get_available_keys() {
            println!("{}", key);
        }
    }

    if args.show {
        println!("# {}", Config::get_config_path().display());
        print!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}
