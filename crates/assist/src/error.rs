/// Errors from the content assist layer.
///
/// Callers treat every variant as "no suggestion available".
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    /// The product description was blank.
    #[error("Product description is empty")]
    EmptyDescription,

    /// No API key is configured.
    #[error("Content assist is not configured (set GEMINI_API_KEY)")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service returned a non-2xx status code.
    #[error("Content service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response carried no candidate text.
    #[error("Content service returned no suggestion")]
    MissingContent,

    /// The candidate text was not the expected JSON object.
    #[error("Malformed suggestion: {0}")]
    Malformed(#[from] serde_json::Error),
}
