use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// Show debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,
    /// Without a subcommand, one command line is read from stdin
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Find and book the best meeting slot, e.g. `run schedule meeting at 3pm`
    Run(RunArgs),
    /// Show the day's events and their analytics
    Events(EventsArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Free-text command; must mention "schedule"
    #[clap(required = true)]
    pub text: Vec<String>,
    /// JSON or YAML file with the organizer's events (defaults to the demo day)
    #[clap(short, long)]
    pub events: Option<PathBuf>,
    /// Event file of another participant; repeat for more
    #[clap(short, long = "participant")]
    pub participants: Vec<PathBuf>,
    /// Emit stage reports as JSON lines instead of the console summary
    #[clap(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EventsArgs {
    /// JSON or YAML file with events (defaults to the demo day)
    #[clap(short, long)]
    pub events: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Write a sample config file
    #[clap(long)]
    pub init: bool,
    /// Print the effective configuration
    #[clap(long)]
    pub show: bool,
    /// Set a value, e.g. `--set availability.buffer_minutes=10`
    #[clap(long, value_name = "KEY=VALUE")]
    pub set: Option<String>,
    /// List the keys accepted by --set
    #[clap(long)]
    pub keys: bool,
}
