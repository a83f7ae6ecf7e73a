use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Tag with slug '{slug}' already exists")]
    Conflict { slug: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("API error: {code} - {message}")]
    Api { code: u16, message: String },

    #[error("Rate limit exceeded, retry after: {retry_after:?}")]
    RateLimit { retry_after: Option<u64> },

    #[error("Request cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Short message suitable for showing next to the form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(e) if e.is_timeout() => "The server did not respond in time".to_string(),
            Error::Http(e) if e.is_connect() => "Could not reach the server".to_string(),
            Error::Api { code, .. } if *code >= 500 => {
                format!("The server failed to create the tag ({})", code)
            }
            Error::RateLimit { retry_after: Some(secs) } => {
                format!("Too many requests, try again in {} seconds", secs)
            }
            Error::RateLimit { retry_after: None } => "Too many requests, try again later".to_string(),
            other => other.to_string(),
        }
    }
}
