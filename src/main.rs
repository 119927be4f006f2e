use clap::Parser;
use slotwise::cli::Cli;
use slotwise::config::Config;
use slotwise::router::route_command;

#[tokio::main]
async fn main() {
    let cli_args = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!(
                "Check {} and the SLOTWISE_* environment variables, or run: slotwise config --init",
                Config::get_config_path().display()
            );
            std::process::exit(1);
        }
    };

    let default_level = if cli_args.verbose || config.general.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = route_command(cli_args, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
