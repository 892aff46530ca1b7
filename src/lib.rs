// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the `genai` command.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the GenAI Bot backend
//   (text generation, usage statistics) and normalizes every failure
//   mode into one `ApiFailure` shape.
// - `config`: Loads and persists CLI settings (endpoint, defaults,
//   timeout) from a YAML file with environment-variable overrides.
// - `prompts`: Parses batch input files into an ordered prompt list.
// - `outcome`: Per-prompt outcome records, the batch summary, and the
//   classification of transport failures (including content-policy
//   violations).
// - `batch`: The bounded-concurrency dispatcher that fans prompts out
//   over worker threads, paces submissions, and persists results.
// - `args`: clap definition of the command-line surface.
// - `commands`: One handler per command group, delegating to `api` and
//   `batch`.
// - `ui`: Terminal output formatting for generations, usage stats and
//   the markdown usage report.
//
// Keeping this separation makes it easier to test the batch and API
// logic without a terminal or a live backend.
pub mod api;
pub mod args;
pub mod batch;
pub mod commands;
pub mod config;
pub mod outcome;
pub mod prompts;
pub mod ui;
