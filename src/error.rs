use thiserror::Error;

/// Why a grammar line was left out of the rule set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no \"->\" or \"→\" separator")]
    MissingArrow,
    #[error("empty left side")]
    EmptyLeftSide,
    #[error("left side contains whitespace")]
    LeftSideContainsWhitespace,
    #[error("left side is the reserved symbol {0}")]
    ReservedLeftSide(String),
}

/// A non-blank grammar line that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}: '{content}'")]
pub struct SkippedLine {
    /// 1-based line number in the grammar text.
    pub line: usize,
    pub content: String,
    pub reason: SkipReason,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read grammar: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse did not finish within {0} steps")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
