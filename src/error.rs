use thiserror::Error;

pub type Result<T> = std::result::Result<T, BitgetError>;

#[derive(Error, Debug)]
pub enum BitgetError {
    /// Caller supplied a product type outside the exchange vocabulary.
    /// Raised before any network call.
    #[error("invalid product type `{given}`, must be one of: {allowed}")]
    InvalidProductType { given: String, allowed: String },

    /// Exchange answered with a non-success business code.
    #[error("bitget api error {code}: {msg}")]
    Api { code: String, msg: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request signing failed: {0}")]
    Sign(String),
}
