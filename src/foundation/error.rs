/// Convenience result type used across Lumina.
pub type LuminaResult<T> = Result<T, LuminaError>;

/// Top-level error taxonomy used by composition APIs.
///
/// Ambiguities are not errors: they travel inside [`crate::DesignIntent`] and are resolved by the
/// clarification loop. Only malformed input and terminal composition failures surface here.
#[derive(thiserror::Error, Debug)]
pub enum LuminaError {
    /// Invalid roofline or intent data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Terminal failure while rendering, compositing or encoding a design.
    #[error("composition error: {message}")]
    Composition {
        /// Human-readable reason.
        message: String,
        /// Whether the caller should steer the user to manual controls instead of retrying.
        recommend_manual: bool,
    },

    /// A clarification answer that cannot be applied to the current intent.
    #[error("clarification error: {0}")]
    Clarification(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LuminaError {
    /// Build a [`LuminaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LuminaError::Composition`] value.
    pub fn composition(msg: impl Into<String>, recommend_manual: bool) -> Self {
        Self::Composition {
            message: msg.into(),
            recommend_manual,
        }
    }

    /// Build a [`LuminaError::Clarification`] value.
    pub fn clarification(msg: impl Into<String>) -> Self {
        Self::Clarification(msg.into())
    }

    /// Build a [`LuminaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` when this error recommends falling back to manual controls.
    pub fn recommends_manual(&self) -> bool {
        matches!(
            self,
            Self::Composition {
                recommend_manual: true,
                ..
            }
        )
    }
}

impl From<serde_json::Error> for LuminaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
