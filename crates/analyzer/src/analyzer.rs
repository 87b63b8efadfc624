//! Inconsistency analysis over a deck's slide records.

use crate::client::ModelClient;
use crate::config::AnalyzerConfig;
use crate::error::ConfigError;
use crate::gemini::GeminiClient;
use crate::prompt::{assemble_request, SYSTEM_INSTRUCTION};
use deck_core::SlideRecord;
use std::fmt;

/// Result of an analysis run. Both variants are printable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The model's report, verbatim.
    Report(String),
    /// A description of why the service call failed.
    Failed(String),
}

impl AnalysisOutcome {
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::Report(text) | AnalysisOutcome::Failed(text) => text,
        }
    }

    pub fn is_report(&self) -> bool {
        matches!(self, AnalysisOutcome::Report(_))
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Sends a whole deck to a model client in one request.
pub struct InconsistencyAnalyzer<C> {
    client: C,
}

impl<C: ModelClient> InconsistencyAnalyzer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Assemble the request, dispatch it and return the report.
    ///
    /// Client failures become [`AnalysisOutcome::Failed`]; nothing is raised.
    pub fn analyze(&self, records: &[SlideRecord]) -> AnalysisOutcome {
        let parts = assemble_request(records);
        log::info!(
            "Requesting analysis of {} slides ({} parts)",
            records.len(),
            parts.len()
        );

        match self.client.generate(SYSTEM_INSTRUCTION, &parts) {
            Ok(report) => AnalysisOutcome::Report(report),
            Err(e) => {
                log::error!("{} request failed: {}", self.client.service_name(), e);
                AnalysisOutcome::Failed(format!(
                    "An error occurred while communicating with the {} API: {}",
                    self.client.service_name(),
                    e
                ))
            }
        }
    }
}

/// Analyze `records` with the Gemini model named in `config`.
///
/// A missing credential is returned as a [`ConfigError`] before any request
/// is assembled. Everything after that is reported through the outcome.
pub fn analyze(
    config: &AnalyzerConfig,
    records: &[SlideRecord],
) -> Result<AnalysisOutcome, ConfigError> {
    let api_key = config.api_key()?;

    let client = match GeminiClient::from_config(config, api_key) {
        Ok(client) => client,
        Err(e) => {
            return Ok(AnalysisOutcome::Failed(format!(
                "An error occurred while communicating with the Gemini API: {}",
                e
            )));
        }
    };

    Ok(InconsistencyAnalyzer::new(client).analyze(records))
}
