//! Error types for the analysis stage.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected before any request is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API credential is not set.
    #[error("{0} not found. Please set it in your .env file or environment.")]
    MissingCredential(&'static str),

    /// An explicitly requested environment file could not be loaded.
    #[error("Failed to load environment file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Failures raised by a model client while generating a response.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, TLS or body transfer failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{status} {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The response carried no text: blocked prompt, no candidates or an
    /// empty candidate.
    #[error("The response contained no text ({0})")]
    EmptyResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = ConfigError::MissingCredential("GOOGLE_API_KEY");
        assert_eq!(
            err.to_string(),
            "GOOGLE_API_KEY not found. Please set it in your .env file or environment."
        );
    }

    #[test]
    fn test_status_message() {
        let err = ClientError::Status {
            status: 429,
            message: "Resource has been exhausted".into(),
        };
        assert_eq!(err.to_string(), "429 Resource has been exhausted");
    }
}
