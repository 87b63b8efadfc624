//! CLI tool for detecting inconsistencies across the slides of a deck.

use anyhow::{Context, Result};
use clap::Parser;
use deck_analyzer::{AnalysisOutcome, AnalyzerConfig};
use deck_pptx::SlideExtractor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "Usage: deck-audit <path_to_pptx_file>";

/// Find factual, numerical and logical inconsistencies across the slides of a
/// PowerPoint deck using the Gemini API.
#[derive(Parser, Debug)]
#[command(name = "deck-audit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: Option<PathBuf>,

    /// Gemini model to use (default: GEMINI_MODEL or gemini-2.5-flash)
    #[arg(short, long)]
    model: Option<String>,

    /// Environment file holding GOOGLE_API_KEY (default: ./.env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let Some(input) = args.input.as_deref() else {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    };

    match load_config(&args).and_then(|config| run(input, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolve configuration once, before any work starts.
fn load_config(args: &Args) -> Result<AnalyzerConfig> {
    let config = match &args.env_file {
        Some(path) => AnalyzerConfig::from_env_file(path)?,
        None => AnalyzerConfig::from_env()?,
    };

    let config = match &args.model {
        Some(model) => config.with_model(model),
        None => config,
    };

    log::debug!("Using model {} at {}", config.model, config.api_base);
    Ok(config)
}

/// Extract the deck, analyze it and print the report.
fn run(input_path: &Path, config: &AnalyzerConfig) -> Result<()> {
    let records = SlideExtractor::new()
        .extract_with_progress(input_path, |slide_number| {
            println!("Processing Slide {}...", slide_number)
        })?;

    log::debug!(
        "Extracted {} slides, {} images",
        records.len(),
        records.iter().map(|r| r.images.len()).sum::<usize>()
    );
    println!("\n Extraction Complete.");

    let outcome = deck_analyzer::analyze(config, &records)
        .context("Cannot start the analysis")?;

    print!("{}", render_report(&outcome));
    Ok(())
}

/// Bordered report section printed after the analysis.
fn render_report(outcome: &AnalysisOutcome) -> String {
    format!(
        "\n--- 🔍 AI Analysis Report ---\n{}\n--- End of Report ---\n",
        outcome
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_input_is_optional() {
        let args = Args::try_parse_from(["deck-audit"]).unwrap();
        assert!(args.input.is_none());

        let args = Args::try_parse_from(["deck-audit", "-m", "gemini-2.5-pro", "deck.pptx"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("deck.pptx")));
        assert_eq!(args.model.as_deref(), Some("gemini-2.5-pro"));
    }

    #[test]
    fn test_render_report() {
        let report = render_report(&AnalysisOutcome::Report("1. Slides 1, 2: conflicting revenue".into()));
        assert_eq!(
            report,
            "\n--- 🔍 AI Analysis Report ---\n1. Slides 1, 2: conflicting revenue\n--- End of Report ---\n"
        );
    }

    #[test]
    fn test_missing_deck_fails_before_analysis() {
        let config = AnalyzerConfig::new(None);
        let err = run(Path::new("/nonexistent/deck.pptx"), &config).unwrap_err();
        assert_eq!(err.to_string(), "File not found at /nonexistent/deck.pptx");
    }
}
