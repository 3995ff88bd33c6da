pub type FrameplotResult<T> = Result<T, FrameplotError>;

#[derive(thiserror::Error, Debug)]
pub enum FrameplotError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameplotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
