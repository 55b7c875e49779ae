use thiserror::Error;

/// Errors raised by the scoring and metrics engine.
///
/// `UnknownTicker` and `UnknownModel` are configuration faults: they only occur
/// when the model catalog and the reference dataset disagree, never from user
/// answers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown ticker '{0}' is not in the reference dataset")]
    UnknownTicker(String),
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("duplicate ticker '{0}' in reference dataset")]
    DuplicateTicker(String),
    #[error("question {index} out of range (questionnaire has {len} questions)")]
    InvalidQuestion { index: usize, len: usize },
    #[error("option {option} out of range for question {question} ({len} options)")]
    InvalidOption {
        question: usize,
        option: usize,
        len: usize,
    },
    #[error("dataset error: {0}")]
    Dataset(String),
}

/// Errors raised while persisting session state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
