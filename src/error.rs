use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultboardError {
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown status value '{value}' for step '{step}'")]
    UnknownStatus { step: String, value: String },

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Locale file parse error: {0}")]
    LocaleParse(#[from] toml::de::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, VaultboardError>;
