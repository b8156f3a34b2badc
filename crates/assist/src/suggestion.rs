use serde::{Deserialize, Serialize};

/// Suggested marketing fields. All four are required in the upstream
/// structured output; a response missing any of them is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingSuggestion {
    /// Short, catchy line.
    pub tagline: String,
    /// Social media caption.
    pub caption: String,
    /// Visual description for an image generator.
    pub prompt: String,
    /// Estimated price, free text.
    #[serde(rename = "harga_saran")]
    pub suggested_price: String,
}

impl MarketingSuggestion {
    /// Parse the structured-output text of a generation response.
    pub fn from_json_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text.trim())
    }
}
