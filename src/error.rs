use thiserror::Error;

/// Errors surfaced to callers of the wizard.
///
/// These are precondition and validation failures only. Transport and parse
/// failures on the two remote calls are never surfaced here; the client folds
/// them into fallback substitution (see [`crate::client::Fetched`]).
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("both profiles must be set before fetching image pairs")]
    ProfilesMissing,

    #[error("no image pairs available; fetch image pairs first")]
    PairsMissing,

    #[error("selections incomplete: {recorded} of {expected} rounds chosen")]
    SelectionsIncomplete { recorded: usize, expected: usize },

    #[error("round {got} submitted out of order, expected round {expected}")]
    RoundOutOfOrder { got: usize, expected: usize },

    #[error("'{value}' is not a candidate in round {round}")]
    UnknownCandidate { round: usize, value: String },

    #[error("{field} must be within 0-100, got {value}")]
    ScoreOutOfRange { field: &'static str, value: u8 },

    #[error("wizard is in state {state}, cannot {action}")]
    StepOutOfOrder {
        state: &'static str,
        action: &'static str,
    },

    #[error("request cancelled")]
    Cancelled,
}

/// Why a remote call was answered with fallback data instead.
///
/// Carried inside [`crate::client::Fetched::Fallback`] so callers and tests
/// can assert which path was taken; never returned as an `Err`.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained a pair with {0} images, expected 2")]
    MalformedPair(usize),

    #[error("response contained no image pairs")]
    EmptyPairs,
}
