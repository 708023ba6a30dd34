/// Crate-wide result alias.
pub type NovellaResult<T> = Result<T, NovellaError>;

/// Errors surfaced by story loading, resolution and navigation.
///
/// Missing assets and absent characters are not errors; the resolver degrades them to absent
/// values.
#[derive(thiserror::Error, Debug)]
pub enum NovellaError {
    /// A scene or slide index (or id) does not exist in the story.
    #[error("not found: {0}")]
    NotFound(String),

    /// The story document is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// A navigation request could not be honored.
    #[error("navigation error: {0}")]
    Navigation(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NovellaError {
    /// Build a [`NovellaError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`NovellaError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NovellaError::Navigation`].
    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    /// Build a [`NovellaError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
