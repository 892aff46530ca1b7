// The `batch process` command: load prompts, hand them to the
// dispatcher, render progress and the final counts.

use anyhow::{bail, Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, GenerateParams};
use crate::args::BatchProcessArgs;
use crate::batch::{run_batch, BatchError, DispatchConfig, SUMMARY_FILENAME};
use crate::config::CliConfig;
use crate::outcome::OutcomeKind;
use crate::prompts::load_prompts;
use crate::ui;

pub fn process(config: &CliConfig, args: BatchProcessArgs) -> Result<()> {
    // clap's f64 parser accepts "inf" and "NaN", both of which would
    // panic inside Duration::from_secs_f64.
    if !args.delay.is_finite() || args.delay < 0.0 {
        bail!("delay must be a non-negative number of seconds");
    }
    let client = ApiClient::new(config)?;

    // Missing or unparseable input aborts before anything is scheduled.
    let prompts = load_prompts(&args.input)?;
    println!(
        "Loaded {} prompts from {}",
        prompts.len(),
        args.input.display()
    );

    let dispatch = DispatchConfig {
        max_workers: args.max_workers,
        delay: Duration::from_secs_f64(args.delay),
        params: GenerateParams {
            max_tokens: args.max_tokens,
            temperature: args.temperature,
            user_id: args.user_id.clone(),
        },
        output_dir: args.output.clone(),
    };
    println!("Output directory: {}", args.output.display());
    println!(
        "Starting batch processing with {} workers, {}s between submissions...",
        args.max_workers, args.delay
    );

    // Ctrl-c stops further submissions; prompts already handed to the
    // pool finish and the partial summary is still written.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
            eprintln!("\nInterrupt received - letting in-flight prompts finish...");
        })
        .context("Failed to install interrupt handler")?;
    }

    let bar = ui::batch_progress(prompts.len() as u64);
    let input_name = args.input.display().to_string();

    let result = run_batch(
        &client,
        &input_name,
        &prompts,
        &dispatch,
        &cancel,
        |outcome, completed, total| {
            let status = match &outcome.kind {
                OutcomeKind::Success { .. } => "ok",
                OutcomeKind::ContentFiltered { .. } => "filtered",
                OutcomeKind::Failure { .. } => "failed",
            };
            bar.println(format!(
                "[{completed}/{total}] prompt {}: {status}",
                outcome.index + 1
            ));
            bar.inc(1);
        },
    );
    bar.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        // An empty input is reported, not fatal.
        Err(BatchError::NoPrompts) => {
            eprintln!("No prompts found in input file");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if cancel.load(Ordering::SeqCst) {
        println!(
            "\nBatch interrupted - summary covers the {} completed prompts",
            summary.total_prompts
        );
    }

    println!("\nBatch Processing Complete");
    println!("Successful: {}", summary.successful);
    println!("Failed: {}", summary.failed);
    if summary.content_filtered > 0 {
        println!("Content Filtered: {}", summary.content_filtered);
    }
    println!(
        "Summary saved to: {}",
        args.output.join(SUMMARY_FILENAME).display()
    );
    if summary.successful > 0 {
        println!("Generated files saved to: {}", args.output.display());
    }
    Ok(())
}
