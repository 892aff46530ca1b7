// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, load configuration, set up
//   logging, and hand off to the matching command handler.
// - Returns `anyhow::Result` so setup failures print a clean error.

use clap::Parser;

use genai_cli::args::{BatchCommands, Cli, Commands, ConfigCommands, GenerateCommands, UsageCommands};
use genai_cli::commands;
use genai_cli::config::CliConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load();
    init_logging(&config.log_level);

    match cli.command {
        Commands::Generate { command } => match command {
            GenerateCommands::Text(args) => commands::generate::text(&config, args),
            GenerateCommands::Interactive { user_id } => {
                commands::generate::interactive(&config, user_id)
            }
        },
        Commands::Batch { command } => match command {
            BatchCommands::Process(args) => commands::batch::process(&config, args),
        },
        Commands::Usage { command } => match command {
            UsageCommands::Stats {
                user_id,
                days,
                format,
            } => commands::usage::stats(&config, user_id, days, format),
            UsageCommands::Summary { user_id } => commands::usage::summary(&config, user_id),
            UsageCommands::Report {
                user_id,
                days,
                output,
            } => commands::usage::report(&config, user_id, days, output),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(&config),
            ConfigCommands::Get { key } => commands::config::get(&config, &key),
            ConfigCommands::Set { key, value } => commands::config::set(&mut config, &key, &value),
            ConfigCommands::Test => commands::config::test(&config),
            ConfigCommands::Reset => commands::config::reset(&mut config),
            ConfigCommands::Init => commands::config::init(&mut config),
        },
        Commands::Status => commands::status::status(&config),
        Commands::Quick { prompt } => commands::generate::quick(&config, &prompt),
    }
}

/// Route tracing output to stderr so command output stays pipeable.
/// `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let default = match level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "WARNING" => "warn",
        "ERROR" => "error",
        _ => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
