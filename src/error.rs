use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EffectError {
    #[error("missing element `{0}`")]
    MissingElement(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("host call failed: {0}")]
    Host(String),
    #[error("submission failed: {0}")]
    Submission(String),
}

impl EffectError {
    pub(crate) fn missing(selector: &str) -> Self {
        Self::MissingElement(selector.to_string())
    }

    /// Missing markup is expected on trimmed-down pages and is logged quieter
    /// than a genuine host failure.
    pub(crate) fn is_missing_element(&self) -> bool {
        matches!(self, Self::MissingElement(_))
    }
}
