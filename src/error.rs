/// Domain-specific error types for the listing lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum PlazaError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// A gateway call failed. Where the provider returned a structured
    /// error body it is attached so handlers can surface it verbatim.
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        payload: Option<serde_json::Value>,
    },

    #[error("store operation failed: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlazaError {
    /// Shorthand for a gateway error with no provider payload.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            payload: None,
        }
    }

    /// The provider's structured error body, if one was attached.
    pub fn gateway_payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Gateway { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

/// Convenience type alias.
pub type PlazaResult<T> = Result<T, PlazaError>;
