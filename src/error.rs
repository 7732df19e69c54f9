use thiserror::Error;

#[derive(Error, Debug)]
pub enum Ask360Error {
    #[error("Data generation error: {0}")]
    Data(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for Ask360Error {
    fn from(e: polars::error::PolarsError) -> Self {
        Ask360Error::Polars(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Ask360Error>;
