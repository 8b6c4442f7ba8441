//! Error type for Github Client

use super::{json::ParseError, Method};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Auth is required for {operation}")]
    AuthRequired { operation: &'static str },

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    #[error("invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid base url")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("resource path `{0}` must start with '/'")]
    InvalidPath(String),

    #[error("repository key `{0}` is not of the form owner/name")]
    InvalidRepoKey(String),

    #[error("entity has no usable `{0}` to build the request from")]
    MissingField(&'static str),
}

impl Error {
    /// The HTTP status code returned by Github, if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// A response from Github with a status code of 400 or above.
///
/// `auth` is already redacted and `params` is the JSON that was sent, so the
/// whole value is safe to log.
#[derive(Debug, Clone)]
pub struct RequestError {
    pub status: StatusCode,
    pub message: String,
    pub method: Method,
    pub path: String,
    pub auth: String,
    pub params: String,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Error [{}] {} ({} {})",
            self.status.as_u16(),
            self.message,
            self.method,
            self.path
        )?;

        if !self.auth.is_empty() {
            write!(f, " (Auth - {})", self.auth)?;
        }

        write!(f, " (Params - {})", self.params)
    }
}

impl std::error::Error for RequestError {}

pub(crate) const UNKNOWN_ERROR: &str = "Unknown Error";

// Github Error Responses
// https://developer.github.com/v3/#client-errors
#[derive(Debug, Deserialize)]
pub(crate) struct GithubClientError {
    message: Option<String>,
}

impl GithubClientError {
    /// Pull the human readable message out of an error body. Bodies that are
    /// not JSON, or carry no message, yield `UNKNOWN_ERROR`.
    pub(crate) fn message_from_body(body: &[u8]) -> String {
        serde_json::from_slice::<GithubClientError>(body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned())
    }
}
