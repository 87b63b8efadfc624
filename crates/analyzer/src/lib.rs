//! Inconsistency analysis for extracted slide decks.
//!
//! Assembles every slide record into one ordered multi-part request, sends
//! it to the Gemini API with a fixed instruction and returns the report.

pub mod analyzer;
pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod prompt;

pub use analyzer::{analyze, AnalysisOutcome, InconsistencyAnalyzer};
pub use client::ModelClient;
pub use config::AnalyzerConfig;
pub use error::{ClientError, ConfigError};
pub use gemini::GeminiClient;
pub use prompt::{assemble_request, LEADING_INSTRUCTION, NO_FINDINGS_SENTENCE, SYSTEM_INSTRUCTION};
