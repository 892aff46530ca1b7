// Command-line definition. Groups mirror the things the CLI can do:
// single generations, batch runs, usage statistics and configuration.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "genai", version)]
#[command(about = "Command-line interface for the AWS GenAI Bot text-generation service")]
#[command(long_about = "Command-line interface for the AWS GenAI Bot text-generation service.\n\n\
Quick start:\n  \
genai config test              # Test your API connection\n  \
genai generate text \"Hello\"    # Generate text\n  \
genai usage stats              # Check usage statistics\n  \
genai generate interactive     # Start an interactive session")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Text generation commands
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
    /// Batch processing of multiple prompts
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },
    /// Usage statistics and analytics
    Usage {
        #[command(subcommand)]
        command: UsageCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Check API status and show quick information
    Status,
    /// Quick text generation (shorthand for `generate text`)
    Quick {
        /// The prompt to generate from
        prompt: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GenerateCommands {
    /// Generate text from a single prompt
    Text(GenerateTextArgs),
    /// Start an interactive generation session
    Interactive {
        /// User ID for tracking
        #[arg(short, long)]
        user_id: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct GenerateTextArgs {
    /// The prompt to generate from
    pub prompt: String,

    /// Maximum tokens to generate
    #[arg(short = 't', long)]
    pub max_tokens: Option<u32>,

    /// Temperature 0.0-1.0
    #[arg(long)]
    pub temperature: Option<f64>,

    /// User ID for tracking
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Save generated text to a file
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// Process multiple prompts from a file
    Process(BatchProcessArgs),
}

#[derive(Args, Debug)]
pub struct BatchProcessArgs {
    /// Input file with prompts (one per line, or a JSON list)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "./batch_output")]
    pub output: PathBuf,

    /// Maximum tokens per generation
    #[arg(short = 't', long)]
    pub max_tokens: Option<u32>,

    /// Temperature for all generations
    #[arg(long)]
    pub temperature: Option<f64>,

    /// User ID for tracking
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Max concurrent requests
    #[arg(short = 'w', long, default_value_t = 3)]
    pub max_workers: usize,

    /// Delay between request submissions (seconds)
    #[arg(short, long, default_value_t = 1.0)]
    pub delay: f64,
}

#[derive(Subcommand, Debug)]
pub enum UsageCommands {
    /// Show usage statistics
    Stats {
        /// User ID (defaults to the configured user)
        #[arg(short, long)]
        user_id: Option<String>,
        /// Number of days to analyze
        #[arg(short, long, default_value_t = 7)]
        days: u32,
        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Show a quick usage summary
    Summary {
        /// User ID (defaults to the configured user)
        #[arg(short, long)]
        user_id: Option<String>,
    },
    /// Generate a detailed markdown usage report
    Report {
        /// User ID (defaults to the configured user)
        #[arg(short, long)]
        user_id: Option<String>,
        /// Number of days to analyze
        #[arg(short, long, default_value_t = 30)]
        days: u32,
        /// Output file for the report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Get one configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Test the connection to the API
    Test,
    /// Reset configuration to defaults
    Reset,
    /// Interactive configuration walkthrough
    Init,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Map the configured `output_format` string to the enum; anything
    /// unrecognized renders as text.
    pub fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn batch_process_defaults() {
        let cli = Cli::try_parse_from(["genai", "batch", "process", "--input", "prompts.txt"])
            .unwrap();
        match cli.command {
            Commands::Batch {
                command: BatchCommands::Process(args),
            } => {
                assert_eq!(args.max_workers, 3);
                assert!((args.delay - 1.0).abs() < f64::EPSILON);
                assert_eq!(args.output, PathBuf::from("./batch_output"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn output_format_falls_back_to_text() {
        assert_eq!(OutputFormat::from_config("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config("yaml"), OutputFormat::Text);
    }
}
