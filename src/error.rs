use thiserror::Error;

/// Why a single fetch attempt did not produce a body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection error, timeout, or any other transport-level problem
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    /// A transport problem that retrying cannot fix (bad URL, client setup)
    #[error("request error: {0}")]
    Request(String),
}

/// Retry class of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Permanent,
}

/// HTTP statuses worth retrying
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

impl FetchFailure {
    pub fn class(&self) -> FailureClass {
        match self {
            FetchFailure::Transport(_) => FailureClass::Transient,
            FetchFailure::Status { status, .. } if RETRYABLE_STATUSES.contains(status) => {
                FailureClass::Transient
            }
            FetchFailure::Status { .. } | FetchFailure::Request(_) => FailureClass::Permanent,
        }
    }

    /// Status code of the failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Terminal failure of a fetch after the retry policy gave up
#[derive(Debug, Clone, Error)]
#[error("failed to fetch {url} after {attempts} attempt(s): {cause}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub cause: FetchFailure,
}

/// The document did not carry a usable embedded payload
#[derive(Debug, Error)]
pub enum MalformedPageError {
    #[error("no `{attribute}` payload found in page")]
    MissingPayload { attribute: &'static str },

    #[error("embedded payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Anything that makes a single page (day listing or match detail) unusable
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Page(#[from] MalformedPageError),
}

/// The hero statistics dataset could not be loaded
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read hero dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hero dataset is empty")]
    Empty,

    #[error("hero dataset `{field}` array could not be located")]
    MissingArray { field: &'static str },

    #[error("hero dataset `{field}` is not valid JSON: {source}")]
    InvalidJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("hero dataset `{field}` entry {index} is not a number")]
    InvalidNumber { field: &'static str, index: usize },
}
