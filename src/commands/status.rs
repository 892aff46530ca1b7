// The `status` command: configuration at a glance plus a connectivity
// probe and 7-day quick stats.

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::CliConfig;
use crate::ui;

pub fn status(config: &CliConfig) -> Result<()> {
    let client = ApiClient::new(config)?;

    println!("AWS GenAI Bot CLI Status");
    println!("{}", "=".repeat(40));
    println!("API Endpoint: {}", config.api_endpoint);
    println!("User ID: {}", config.default_user_id);

    println!("\nTesting API connection...");
    if client.health_check() {
        println!("API is accessible");
        if let Ok(stats) = client.get_usage(&config.default_user_id, 7) {
            println!(
                "Requests (7 days): {}",
                ui::thousands(stats.total_requests)
            );
            println!(
                "Total tokens: {}",
                ui::thousands(stats.total_input_tokens + stats.total_output_tokens)
            );
        }
    } else {
        println!("API connection failed");
        println!("Run 'genai config test' for detailed diagnostics");
    }
    Ok(())
}
