// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OMR — grade photographed multiple-choice answer sheets.
//
// Entry point. Parses the command line, initialises logging, loads the grader
// configuration, and runs the chosen command.

mod report;
mod services;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use omr_core::human_errors::{Severity, humanize_error};
use omr_core::{AnswerVector, GraderConfig, OmrError, Result};

use report::{DecodeReport, SessionReport};
#[cfg(feature = "dialog")]
use services::catalog::DialogImagePicker;
use services::catalog::ImagePicker;
#[cfg(not(feature = "dialog"))]
use services::catalog::{ConsoleImagePicker, ImageCatalog};
use services::config_dir::{default_config_path, resolve_config};
use services::grading::{GradingService, KeySource};

#[derive(Parser)]
#[command(name = "omr")]
#[command(about = "Decode and grade photographed multiple-choice answer sheets")]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission against an answer key.
    Grade(GradeArgs),

    /// Decode one sheet and print its answers.
    Decode(DecodeArgs),

    /// Print the default configuration, or write it to a file.
    Config {
        /// Write to this path instead of printing.
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct GradeArgs {
    /// Photograph of the filled-in answer key.
    #[arg(long, conflicts_with = "key_text")]
    key: Option<PathBuf>,

    /// Answer key typed as codes, e.g. "ABCDE-*" (one per question).
    #[arg(long)]
    key_text: Option<String>,

    /// Photograph of the student's sheet.
    #[arg(long)]
    submission: Option<PathBuf>,

    /// Folder to choose photographs from when they are not given.
    #[arg(long, default_value = "./Images")]
    images_dir: PathBuf,

    /// Grader configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct DecodeArgs {
    /// Photograph of the sheet.
    image: PathBuf,

    /// Include block corners and per-cell mark counts.
    #[arg(long)]
    counts: bool,

    /// Grader configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    tracing::debug!("omr starting");

    let outcome = match cli.command {
        Commands::Grade(args) => run_grade(args).await,
        Commands::Decode(args) => run_decode(args).await,
        Commands::Config { write } => run_config(write.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::from(exit_status(human.severity))
        }
    }
}

/// 2 when the command line or configuration must change, 1 otherwise.
fn exit_status(severity: Severity) -> u8 {
    match severity {
        Severity::Usage | Severity::FixConfiguration => 2,
        Severity::RetakePhoto | Severity::FileAccess => 1,
    }
}

async fn run_grade(args: GradeArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let service = GradingService::new(&config)?;

    let needs_picker =
        args.submission.is_none() || (args.key.is_none() && args.key_text.is_none());
    #[cfg(not(feature = "dialog"))]
    let catalog;
    let mut picker: Option<Box<dyn ImagePicker + '_>> = None;
    if needs_picker {
        #[cfg(feature = "dialog")]
        {
            picker = Some(Box::new(DialogImagePicker::new(args.images_dir.clone())));
        }
        #[cfg(not(feature = "dialog"))]
        {
            catalog = ImageCatalog::scan(&args.images_dir)?;
            picker = Some(Box::new(ConsoleImagePicker::new(
                &catalog,
                io::stdin().lock(),
                io::stdout(),
            )));
        }
    }

    let submission = match (args.submission, picker.as_deref_mut()) {
        (Some(path), _) => path,
        (None, Some(picker)) => pick(picker, "Choose the image to grade")?,
        (None, None) => return Err(cancelled()),
    };

    let (key, key_label) = match (args.key, args.key_text, picker.as_deref_mut()) {
        (Some(path), _, _) => {
            let label = path.display().to_string();
            (KeySource::Image(path), label)
        }
        (None, Some(text), _) => (KeySource::Text(text.parse::<AnswerVector>()?), "typed".into()),
        (None, None, Some(picker)) => {
            let path = pick(picker, "Choose the answer key image")?;
            let label = path.display().to_string();
            (KeySource::Image(path), label)
        }
        (None, None, None) => return Err(cancelled()),
    };
    drop(picker);

    let outcome = service.grade(key, &submission).await?;
    let report = SessionReport::new(key_label, submission.display().to_string(), &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn pick<P: ImagePicker + ?Sized>(picker: &mut P, prompt: &str) -> Result<PathBuf> {
    picker.pick_image(prompt)?.ok_or_else(cancelled)
}

fn cancelled() -> OmrError {
    OmrError::Io(io::Error::new(io::ErrorKind::Interrupted, "no image was chosen"))
}

async fn run_decode(args: DecodeArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let service = GradingService::new(&config)?;

    let reading = service.decode_image(&args.image).await?;
    let report = DecodeReport::new(args.image.display().to_string(), reading, args.counts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn run_config(write: Option<&Path>) -> Result<()> {
    let config = GraderConfig::default();
    match write {
        Some(path) => {
            config.save(path)?;
            println!("Default configuration written to {}", path.display());
            println!("It is read automatically from {}", default_config_path().display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_follows_severity() {
        let status = |err: OmrError| exit_status(humanize_error(&err).severity);
        assert_eq!(status(OmrError::InsufficientCandidates { found: 1, required: 2 }), 1);
        assert_eq!(status(OmrError::Io(io::Error::from(io::ErrorKind::NotFound))), 1);
        assert_eq!(status(OmrError::InvalidVision("canny".into())), 2);
        assert_eq!(status(OmrError::LengthMismatch { key: 50, submission: 25 }), 2);
        assert_eq!(status(cancelled()), 2);
    }

    #[test]
    fn key_image_and_typed_key_conflict() {
        let parsed = Cli::try_parse_from(["omr", "grade", "--key", "k.jpg", "--key-text", "AB"]);
        assert!(parsed.is_err());
    }
}
