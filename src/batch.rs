// Batch dispatcher: fans prompts out over a fixed pool of worker
// threads, paces submissions to protect the rate-limited backend,
// collects outcomes as they complete and restores input ordering before
// the summary is written.
//
// Two rates are tunable independently: `max_workers` caps how many
// requests are in flight, while `delay` throttles how fast new jobs are
// offered to the pool. The pacing sleep happens on the submitting
// thread, never inside a worker.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{GenerateParams, TextGenerator};
use crate::outcome::{classify_failure, prompt_preview, BatchSummary, OutcomeKind, PromptOutcome};

pub const SUMMARY_FILENAME: &str = "batch_summary.json";

/// Tunables for one batch run, supplied once at start.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Worker pool size; 1 degrades to fully sequential processing.
    pub max_workers: usize,
    /// Pause between job submissions (skipped after the last prompt).
    pub delay: Duration,
    /// Generation parameter overrides applied to every prompt.
    pub params: GenerateParams,
    /// Directory receiving per-item files and the summary.
    pub output_dir: PathBuf,
}

/// Pre-flight failures that abort the batch before any work is
/// scheduled. Per-prompt failures never surface here; they become
/// outcome records instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No prompts to process")]
    NoPrompts,
    #[error("Could not create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write batch summary: {0}")]
    SummaryWrite(String),
}

struct Job {
    index: usize,
    prompt: String,
}

/// Run a batch to completion. `on_complete` fires once per prompt in
/// completion order (for progress reporting); the returned summary and
/// the persisted `batch_summary.json` are always in input order.
///
/// Setting `cancel` stops further submissions; jobs already handed to
/// the pool finish, and a partial summary covering them is still
/// written.
pub fn run_batch<G, F>(
    generator: &G,
    input_name: &str,
    prompts: &[String],
    config: &DispatchConfig,
    cancel: &AtomicBool,
    mut on_complete: F,
) -> Result<BatchSummary, BatchError>
where
    G: TextGenerator + Sync,
    F: FnMut(&PromptOutcome, usize, usize),
{
    if prompts.is_empty() {
        return Err(BatchError::NoPrompts);
    }
    fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.display().to_string(),
        source,
    })?;

    let workers = config.max_workers.max(1);
    debug!(
        workers,
        delay_secs = config.delay.as_secs_f64(),
        total = prompts.len(),
        "starting batch"
    );

    let (job_tx, job_rx) = mpsc::channel::<Job>();
    // Workers pull from one shared queue; mpsc receivers are single
    // consumer, so the handle is wrapped in a mutex.
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (done_tx, done_rx) = mpsc::channel::<PromptOutcome>();

    let total = prompts.len();
    let mut outcomes: Vec<PromptOutcome> = Vec::with_capacity(total);

    thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let done_tx = done_tx.clone();
            s.spawn(move || loop {
                // Hold the lock only for the receive itself, so other
                // workers can pull jobs while this one is on the wire.
                let job = match job_rx.lock().unwrap().recv() {
                    Ok(job) => job,
                    Err(_) => break,
                };
                let outcome = process_prompt(generator, job, config);
                if done_tx.send(outcome).is_err() {
                    break;
                }
            });
        }
        // The collector loop below ends once every worker has dropped
        // its sender clone.
        drop(done_tx);

        let mut submitted = 0;
        for (index, prompt) in prompts.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                warn!(submitted, total, "batch cancelled; skipping remaining prompts");
                break;
            }
            let job = Job {
                index,
                prompt: prompt.clone(),
            };
            if job_tx.send(job).is_err() {
                break;
            }
            submitted += 1;
            if !config.delay.is_zero() && index + 1 < total {
                thread::sleep(config.delay);
            }
        }
        // Closing the queue lets idle workers exit.
        drop(job_tx);

        for outcome in done_rx {
            on_complete(&outcome, outcomes.len() + 1, total);
            outcomes.push(outcome);
        }
    });

    // Completion order depends on worker availability and per-request
    // latency; the persisted record is keyed to input order.
    outcomes.sort_by_key(|o| o.index);

    let summary = BatchSummary::from_outcomes(
        input_name.to_string(),
        config.output_dir.display().to_string(),
        outcomes,
    );
    write_summary(config, &summary)?;
    debug!(
        successful = summary.successful,
        failed = summary.failed,
        content_filtered = summary.content_filtered,
        "batch complete"
    );
    Ok(summary)
}

/// One unit of work: a single generation attempt, timed, classified,
/// and (on success) persisted to its index-keyed output file.
fn process_prompt<G: TextGenerator>(generator: &G, job: Job, config: &DispatchConfig) -> PromptOutcome {
    let start = Instant::now();
    let result = generator.generate(&job.prompt, &config.params);
    let processing_time = start.elapsed().as_secs_f64();

    let kind = match result {
        Ok(generation) => {
            let output_file = config
                .output_dir
                .join(format!("result_{:04}.txt", job.index + 1));
            match fs::write(&output_file, &generation.generated_text) {
                Ok(()) => {
                    debug!(index = job.index, file = %output_file.display(), "saved generation");
                    OutcomeKind::Success {
                        output_file: output_file.display().to_string(),
                        metadata: generation.metadata,
                    }
                }
                // A result we cannot persist counts as a failed item;
                // the batch itself carries on.
                Err(err) => OutcomeKind::Failure {
                    error: format!("Failed to write {}: {}", output_file.display(), err),
                    status_code: 0,
                },
            }
        }
        Err(failure) => classify_failure(&failure),
    };

    PromptOutcome {
        index: job.index,
        prompt: prompt_preview(&job.prompt),
        processing_time,
        kind,
    }
}

fn write_summary(config: &DispatchConfig, summary: &BatchSummary) -> Result<(), BatchError> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| BatchError::SummaryWrite(e.to_string()))?;
    let path = config.output_dir.join(SUMMARY_FILENAME);
    fs::write(&path, json).map_err(|e| BatchError::SummaryWrite(e.to_string()))?;
    Ok(())
}
