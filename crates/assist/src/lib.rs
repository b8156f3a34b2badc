//! Content assist: marketing copy suggestions from a product description.
//!
//! [`ContentAssist`] is the seam the application controller calls;
//! [`GeminiClient`] implements it against the Generative Language API.

use async_trait::async_trait;

pub mod error;
pub mod gemini;
pub mod suggestion;

pub use error::AssistError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use suggestion::MarketingSuggestion;

/// Generates suggested marketing fields for a product.
#[async_trait]
pub trait ContentAssist: Send + Sync {
    /// Suggest copy for `product_info`.
    ///
    /// Blank input is rejected with [`AssistError::EmptyDescription`]
    /// before any request is made.
    async fn generate(&self, product_info: &str) -> Result<MarketingSuggestion, AssistError>;
}
