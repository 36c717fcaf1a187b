//! bud: transcribe a child's recording and print feedback as JSON.
//!
//! ```text
//! bud transcribe recording.wav --mode detailed --child-age 6
//! bud health
//! ```
//!
//! Results go to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bud_feedback::FeedbackMode;
use bud_pipeline::{Pipeline, PipelineError};
use bud_settings::BudSettings;
use bud_speech::AudioPayload;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "bud",
    about = "Speech transcription and feedback for children's English practice"
)]
struct Cli {
    /// Settings file (defaults to ~/.bud/settings.json).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one recording through the pipeline.
    Transcribe {
        /// Audio file to transcribe.
        file: PathBuf,

        /// MIME type of the recording (e.g. `audio/wav`).
        #[arg(long)]
        content_type: Option<String>,

        /// Declared format token; derived from the content type or file
        /// extension when omitted.
        #[arg(long)]
        format: Option<String>,

        /// Feedback mode: short, detailed, or general.
        #[arg(long, default_value = "short")]
        mode: FeedbackMode,

        /// Child's age, used by detailed feedback.
        #[arg(long)]
        child_age: Option<u8>,

        /// Override the configured pipeline deadline.
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
    /// Report backend readiness without calling any backend.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load(cli.settings.as_deref())?;
    bud_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);

    let pipeline = Pipeline::from_settings(&settings);

    match cli.command {
        Command::Health => {
            let health = pipeline.health();
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !health.all_available() {
                std::process::exit(1);
            }
        }
        Command::Transcribe {
            file,
            content_type,
            format,
            mode,
            child_age,
            deadline_ms,
        } => {
            let payload = read_payload(&file, content_type).await?;
            let format = format.unwrap_or_else(|| payload.format_token());
            let deadline =
                Duration::from_millis(deadline_ms.unwrap_or(settings.pipeline.deadline_ms));
            info!(file = %file.display(), %format, %mode, "transcribing");

            match pipeline
                .run_with_deadline(&payload, &format, mode, child_age, deadline)
                .await
            {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(PipelineError::Validation(e)) => {
                    anyhow::bail!("invalid audio file {}: {e}", file.display())
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn load(path: Option<&Path>) -> Result<BudSettings> {
    match path {
        Some(path) => bud_settings::load_settings_from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => bud_settings::load_settings().context("failed to load settings"),
    }
}

async fn read_payload(file: &Path, content_type: Option<String>) -> Result<AudioPayload> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(AudioPayload::new(bytes, content_type, filename))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
