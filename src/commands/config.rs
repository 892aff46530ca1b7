// Configuration commands: show, get, set, test, reset and the
// interactive init walkthrough.

use anyhow::Result;
use dialoguer::{Confirm, Input};

use crate::api::{ApiClient, GenerateParams};
use crate::config::CliConfig;
use crate::ui;

pub fn show(config: &CliConfig) -> Result<()> {
    println!("Current Configuration");
    println!("{}", "=".repeat(50));
    for (key, value) in config.display() {
        let suffix = if key == "timeout" { "s" } else { "" };
        println!("{}: {}{}", ui::title_case(key), value, suffix);
    }
    Ok(())
}

pub fn get(config: &CliConfig, key: &str) -> Result<()> {
    match config.get(key) {
        Some(value) => println!("{key}: {value}"),
        None => {
            eprintln!("Configuration key '{key}' not found");
            eprintln!("Use 'genai config show' to see all available keys");
        }
    }
    Ok(())
}

pub fn set(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    config.save()?;
    println!("Configuration updated: {key} = {value}");
    Ok(())
}

/// Send a small probe generation and print troubleshooting hints when
/// it fails.
pub fn test(config: &CliConfig) -> Result<()> {
    let client = ApiClient::new(config)?;
    println!("Testing connection to: {}", config.api_endpoint);
    println!("Sending test request...");

    let params = GenerateParams {
        max_tokens: Some(50),
        ..GenerateParams::default()
    };
    match client.generate("Hello, this is a test message", &params) {
        Ok(generation) => {
            println!("Connection successful!");
            let mock = generation
                .metadata
                .get("mock_mode")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            if mock {
                println!("API is running in mock mode");
                println!("Enable Bedrock model access for real AI responses");
            } else {
                println!("Real AI responses are enabled");
            }
            if let Some(ms) = generation.metadata.get("response_time_ms") {
                println!("Response time: {ms}ms");
            }
        }
        Err(failure) => {
            eprintln!("Connection failed");
            eprintln!("Error: {failure}");
            match failure.status_code() {
                403 => eprintln!("This might be an authentication or permission issue"),
                404 => eprintln!("Check if your API endpoint URL is correct"),
                code if code >= 500 => eprintln!("This appears to be a server-side issue"),
                _ => {}
            }
            eprintln!("\nTroubleshooting:");
            eprintln!("1. Verify your API endpoint with 'genai config show'");
            eprintln!("2. Check if the GenAI Bot service is deployed");
            eprintln!("3. Ensure the API gateway is properly configured");
        }
    }
    Ok(())
}

pub fn reset(config: &mut CliConfig) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt("Reset all configuration to defaults?")
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }
    *config = CliConfig::default();
    config.save()?;
    println!("Configuration reset to defaults");
    println!("Use 'genai config test' to verify the connection");
    Ok(())
}

pub fn init(config: &mut CliConfig) -> Result<()> {
    println!("Welcome to the GenAI Bot CLI setup!");
    println!("This will help you configure the CLI to work with your API.");
    println!();

    println!("Current API endpoint: {}", config.api_endpoint);
    if Confirm::new()
        .with_prompt("Do you want to change the API endpoint?")
        .default(false)
        .interact()?
    {
        let endpoint: String = Input::new()
            .with_prompt("Enter your API gateway endpoint")
            .default(config.api_endpoint.clone())
            .interact_text()?;
        config.set("api_endpoint", &endpoint)?;
    }

    let user_id: String = Input::new()
        .with_prompt("Enter your default user ID")
        .default(config.default_user_id.clone())
        .interact_text()?;
    config.set("default_user_id", &user_id)?;

    if Confirm::new()
        .with_prompt("Do you want to set custom default parameters?")
        .default(false)
        .interact()?
    {
        let max_tokens: u32 = Input::new()
            .with_prompt("Default max tokens")
            .default(config.default_max_tokens)
            .interact_text()?;
        config.set("default_max_tokens", &max_tokens.to_string())?;

        let temperature: f64 = Input::new()
            .with_prompt("Default temperature (0.0-1.0)")
            .default(config.default_temperature)
            .interact_text()?;
        config.set("default_temperature", &temperature.to_string())?;
    }

    config.save()?;
    println!("\nConfiguration saved!");

    if Confirm::new()
        .with_prompt("Test the connection now?")
        .default(true)
        .interact()?
    {
        println!();
        test(config)?;
    }
    Ok(())
}
