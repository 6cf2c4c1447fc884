// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching a page
///
/// The pipeline treats every variant the same way: the page is unavailable.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = source.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Errors that can occur when locating the framework's embedded JSON state
#[derive(Error, Debug)]
pub enum EmbeddedDataError {
    #[error("No embedded data found in page")]
    NotFound,

    #[error("Embedded data is malformed: {reason}")]
    Malformed { reason: String },

    #[error("Embedded data is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors that can occur when rendering or rewriting a feed document
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to serialize RSS feed: {0}")]
    SerializeFailed(#[source] rss::Error),

    #[error("Failed to parse generated RSS feed: {0}")]
    ParseFailed(#[source] rss::Error),

    #[error("Generated feed is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to create output directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write feed file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in the static programme configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid site base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("No programmes configured")]
    NoProgrammes,

    #[error("Programme slug must not be empty")]
    EmptySlug,

    #[error("Programme '{0}' is configured more than once")]
    DuplicateSlug(String),

    #[error("Unknown programme '{0}'")]
    UnknownProgramme(String),
}

/// Errors that abort a single programme without affecting the rest of the run
#[derive(Error, Debug)]
pub enum ProgrammeError {
    #[error("Programme page unavailable: {0}")]
    PageUnavailable(#[from] FetchError),

    #[error("Invalid programme URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Top-level errors for a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
