use crate::snippets::Difficulty;

/// Snippet lookups that found nothing, or bundled data that failed to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnippetError {
    #[error("no snippets registered for language '{0}'")]
    UnknownLanguage(String),

    #[error("no {difficulty} snippets for language '{language}'")]
    NoSnippetForDifficulty {
        language: String,
        difficulty: Difficulty,
    },

    #[error("no snippet with id '{0}'")]
    UnknownSnippet(String),

    #[error("invalid snippet table '{name}': {reason}")]
    InvalidTable { name: String, reason: String },
}

impl SnippetError {
    /// True for lookups that simply had no match.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, SnippetError::InvalidTable { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Snippet(#[from] SnippetError),

    #[error("empty snippet: there is nothing to type")]
    EmptySnippet,

    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
