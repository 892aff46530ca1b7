// UI layer: terminal output formatting for generations and usage
// statistics, plus the indicatif progress helpers the command handlers
// share. Rendering is kept as plain functions returning strings so the
// formats are testable without a terminal.

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::api::{Generation, UsageStats};
use crate::args::OutputFormat;

/// Spinner shown while a single request is on the wire.
pub fn request_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Progress bar for a batch run, one tick per completed prompt.
pub fn batch_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    bar
}

/// Render a successful generation in the requested format.
pub fn render_generation(generation: &Generation, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(generation).expect("generation serializes to JSON")
        }
        OutputFormat::Text => {
            let mut output = generation.generated_text.clone();
            if !generation.metadata.is_empty() {
                output.push_str("\n\n--- Response Details ---");
                for (key, value) in &generation.metadata {
                    output.push_str(&format!("\n{}: {}", title_case(key), value_display(value)));
                }
            }
            output
        }
    }
}

/// Render usage statistics in the requested format.
pub fn render_usage_stats(stats: &UsageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(stats).expect("usage stats serialize to JSON")
        }
        OutputFormat::Text => {
            let mut output = format!("Usage Statistics for {}\n", stats.user_id);
            output.push_str(&"=".repeat(50));
            output.push('\n');
            output.push_str(&format!("Period: {} days\n", stats.period_days));
            output.push_str(&format!(
                "Total Requests: {}\n",
                thousands(stats.total_requests)
            ));
            output.push_str(&format!(
                "Total Input Tokens: {}\n",
                thousands(stats.total_input_tokens)
            ));
            output.push_str(&format!(
                "Total Output Tokens: {}\n",
                thousands(stats.total_output_tokens)
            ));
            output.push_str(&format!(
                "Average Response Time: {}ms\n",
                stats.average_response_time_ms
            ));
            output.push_str(&format!(
                "Content Filter Events: {}\n",
                stats.content_filter_events
            ));
            output.push_str(&format!("Status: {}\n", title_case(&stats.status)));
            output.push_str(&format!(
                "Last Request: {}\n",
                stats.last_request.as_deref().unwrap_or("N/A")
            ));
            if !stats.requests_by_day.is_empty() {
                output.push_str("\nDaily Breakdown:\n");
                for day in &stats.requests_by_day {
                    output.push_str(&format!(
                        "  {}: {} requests, {} tokens\n",
                        day.date,
                        day.requests,
                        thousands(day.tokens)
                    ));
                }
            }
            output
        }
    }
}

/// Build the markdown usage report over several time windows.
pub fn usage_report(user_id: &str, windows: &[(u32, UsageStats)], max_days: u32) -> String {
    let mut report = String::from("# AWS GenAI Bot Usage Report\n\n");
    report.push_str(&format!("**User ID:** {user_id}\n"));
    report.push_str(&format!(
        "**Generated:** {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("**Report Period:** {max_days} days\n\n"));

    if let Some((_, latest)) = windows.iter().find(|(days, _)| *days == max_days) {
        report.push_str("## Executive Summary\n\n");
        report.push_str(&format!(
            "- **Total Requests:** {}\n",
            thousands(latest.total_requests)
        ));
        report.push_str(&format!(
            "- **Total Tokens Processed:** {}\n",
            thousands(latest.total_input_tokens + latest.total_output_tokens)
        ));
        report.push_str(&format!(
            "- **Average Response Time:** {}ms\n",
            latest.average_response_time_ms
        ));
        report.push_str(&format!(
            "- **Content Filter Events:** {}\n",
            latest.content_filter_events
        ));
        report.push_str(&format!(
            "- **Account Status:** {}\n\n",
            title_case(&latest.status)
        ));
    }

    for (days, stats) in windows {
        report.push_str(&format!("## {days} Day Analysis\n\n"));
        report.push_str("| Metric | Value |\n|--------|-------|\n");
        report.push_str(&format!(
            "| Requests | {} |\n",
            thousands(stats.total_requests)
        ));
        report.push_str(&format!(
            "| Input Tokens | {} |\n",
            thousands(stats.total_input_tokens)
        ));
        report.push_str(&format!(
            "| Output Tokens | {} |\n",
            thousands(stats.total_output_tokens)
        ));
        report.push_str(&format!(
            "| Avg Response Time | {}ms |\n",
            stats.average_response_time_ms
        ));
        report.push_str(&format!(
            "| Filter Events | {} |\n\n",
            stats.content_filter_events
        ));

        if !stats.requests_by_day.is_empty() {
            report.push_str(&format!("### Daily Activity ({days} days)\n\n"));
            report.push_str("| Date | Requests | Tokens |\n|------|----------|--------|\n");
            for day in &stats.requests_by_day {
                report.push_str(&format!(
                    "| {} | {} | {} |\n",
                    day.date,
                    day.requests,
                    thousands(day.tokens)
                ));
            }
            report.push('\n');
        }
    }

    if let Some((_, latest)) = windows.iter().find(|(days, _)| *days == max_days) {
        report.push_str("## Recommendations\n\n");
        if latest.total_requests > 1000 {
            report.push_str(
                "- High usage detected - consider monitoring costs and implementing rate limiting\n",
            );
        } else if latest.total_requests < 10 {
            report.push_str("- Low usage - consider promoting the service or checking integration\n");
        }
        if latest.content_filter_events > 0 {
            report.push_str(&format!(
                "- {} content filter events detected - review input guidelines\n",
                latest.content_filter_events
            ));
        }
        if latest.average_response_time_ms > 1000 {
            report.push_str("- High response times - monitor API performance\n");
        }
        report.push_str("- Regular monitoring recommended for optimal performance\n");
    }

    report
}

/// "output_tokens" -> "Output Tokens".
pub fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group digits with commas for readable token counts.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn value_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
