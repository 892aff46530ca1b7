// Single-prompt generation: the `generate text`, `generate interactive`
// and `quick` commands.

use anyhow::Result;
use dialoguer::Input;
use serde_json::Value;
use std::fs;

use crate::api::{ApiClient, GenerateParams};
use crate::args::{GenerateTextArgs, OutputFormat};
use crate::config::CliConfig;
use crate::ui;

pub fn text(config: &CliConfig, args: GenerateTextArgs) -> Result<()> {
    let client = ApiClient::new(config)?;
    let params = GenerateParams {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        user_id: args.user_id.clone(),
    };
    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from_config(&config.output_format));

    let spinner = ui::request_spinner("Generating...");
    let result = client.generate(&args.prompt, &params);
    spinner.finish_and_clear();

    let generation = match result {
        Ok(generation) => generation,
        Err(failure) => {
            super::report_failure(&failure);
            return Ok(());
        }
    };

    println!("{}", ui::render_generation(&generation, format));

    if let Some(path) = &args.save {
        let contents = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&generation)?,
            OutputFormat::Text => generation.generated_text.clone(),
        };
        match fs::write(path, contents) {
            Ok(()) => println!("\nGenerated text saved to {}", path.display()),
            // The generation was already printed; a failed save should
            // not turn it into a hard error.
            Err(err) => eprintln!("Error saving file: {err}"),
        }
    }
    Ok(())
}

pub fn interactive(config: &CliConfig, user_id: Option<String>) -> Result<()> {
    let client = ApiClient::new(config)?;
    let session_user = user_id.unwrap_or_else(|| config.default_user_id.clone());

    println!("AWS GenAI Bot - Interactive Mode");
    println!("Type 'quit' or 'exit' to leave");
    println!("Type 'help' for commands");
    println!("Type 'stats' to see your usage statistics");
    println!();

    loop {
        // EOF (ctrl-d) ends the session like an explicit quit.
        let prompt: String = match Input::new().with_prompt("You").interact_text() {
            Ok(line) => line,
            Err(_) => break,
        };

        match prompt.trim().to_lowercase().as_str() {
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("Commands:");
                println!("  help   - Show this help");
                println!("  stats  - Show usage statistics");
                println!("  quit   - Exit interactive mode");
                continue;
            }
            "stats" => {
                match client.get_usage(&session_user, 7) {
                    Ok(stats) => {
                        println!(
                            "Total Requests (7 days): {}",
                            ui::thousands(stats.total_requests)
                        );
                        println!(
                            "Total tokens: {}",
                            ui::thousands(stats.total_input_tokens + stats.total_output_tokens)
                        );
                    }
                    Err(failure) => eprintln!("Could not fetch stats: {failure}"),
                }
                continue;
            }
            _ => {}
        }

        let params = GenerateParams {
            user_id: Some(session_user.clone()),
            ..GenerateParams::default()
        };
        match client.generate(&prompt, &params) {
            Ok(generation) => {
                println!("\nBot: {}", generation.generated_text);
                if is_mock_mode(&generation.metadata) {
                    println!("(Mock mode - enable Bedrock for real AI responses)");
                } else if let Some(tokens) = generation.metadata.get("output_tokens") {
                    println!("({tokens} tokens)");
                }
                println!();
            }
            Err(failure) => super::report_failure(&failure),
        }
    }
    Ok(())
}

pub fn quick(config: &CliConfig, prompt: &str) -> Result<()> {
    let client = ApiClient::new(config)?;
    match client.generate(prompt, &GenerateParams::default()) {
        Ok(generation) => {
            println!("{}", generation.generated_text);
            if is_mock_mode(&generation.metadata) {
                println!("\n(Mock mode - enable Bedrock for real AI responses)");
            }
        }
        Err(failure) => super::report_failure(&failure),
    }
    Ok(())
}

fn is_mock_mode(metadata: &serde_json::Map<String, Value>) -> bool {
    metadata
        .get("mock_mode")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
