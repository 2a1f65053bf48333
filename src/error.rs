//! Error types for the typeahead binary

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while setting up or running a front end
#[derive(Error, Debug)]
pub enum AppError {
    #[error("cannot read response file {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no endpoint configured (use --url or --response-file)")]
    NoEndpoint,

    #[error("query did not settle within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, AppError>;
