use thiserror::Error;

/// Failures reported by a model gateway. All of them end the current
/// transition; none are retried.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model invocation failed: {message}")]
    Provider {
        /// HTTP status from the provider, when the request got that far.
        status: Option<u16>,
        message: String,
    },

    #[error("model returned no content")]
    EmptyContent,

    #[error("model output is not valid JSON: {message}")]
    Decode { message: String, raw: String },
}

impl GatewayError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }
}
