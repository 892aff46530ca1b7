// Usage statistics commands: `stats`, `summary` and the markdown
// `report`.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::args::OutputFormat;
use crate::config::CliConfig;
use crate::ui;

pub fn stats(
    config: &CliConfig,
    user_id: Option<String>,
    days: u32,
    format: Option<OutputFormat>,
) -> Result<()> {
    let client = ApiClient::new(config)?;
    let user = user_id.unwrap_or_else(|| config.default_user_id.clone());
    let format = format.unwrap_or_else(|| OutputFormat::from_config(&config.output_format));

    match client.get_usage(&user, days) {
        Ok(stats) => println!("{}", ui::render_usage_stats(&stats, format)),
        Err(failure) => eprintln!("Error fetching usage stats: {failure}"),
    }
    Ok(())
}

pub fn summary(config: &CliConfig, user_id: Option<String>) -> Result<()> {
    let client = ApiClient::new(config)?;
    let user = user_id.unwrap_or_else(|| config.default_user_id.clone());

    match client.get_usage(&user, 7) {
        Ok(stats) => {
            println!("Quick Summary for {user}");
            println!("{}", "=".repeat(40));
            println!(
                "Total Requests (7 days): {}",
                ui::thousands(stats.total_requests)
            );
            println!("Input Tokens: {}", ui::thousands(stats.total_input_tokens));
            println!(
                "Output Tokens: {}",
                ui::thousands(stats.total_output_tokens)
            );
            println!("Avg Response Time: {}ms", stats.average_response_time_ms);
            println!("Filter Events: {}", stats.content_filter_events);
            println!(
                "Last Request: {}",
                stats.last_request.as_deref().unwrap_or("N/A")
            );
            println!("Status: {}", ui::title_case(&stats.status));
        }
        Err(failure) => eprintln!("Error: {failure}"),
    }
    Ok(())
}

pub fn report(
    config: &CliConfig,
    user_id: Option<String>,
    days: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = ApiClient::new(config)?;
    let user = user_id.unwrap_or_else(|| config.default_user_id.clone());

    let mut periods = if days > 7 { vec![1, 7, days] } else { vec![1, days] };
    periods.dedup();

    println!("Generating usage report...");
    let mut windows = Vec::new();
    for period in periods {
        println!("  Fetching {period} day statistics...");
        match client.get_usage(&user, period) {
            Ok(stats) => windows.push((period, stats)),
            Err(failure) => eprintln!("  Skipping {period} day window: {failure}"),
        }
    }

    if windows.is_empty() {
        eprintln!("No data available for report generation");
        return Ok(());
    }

    let report = ui::usage_report(&user, &windows, days);
    match output {
        Some(path) => match fs::write(&path, &report) {
            Ok(()) => println!("Report saved to {}", path.display()),
            Err(err) => eprintln!("Error saving report: {err}"),
        },
        None => println!("{report}"),
    }
    Ok(())
}
