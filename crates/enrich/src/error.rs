#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("backend returned no candidates")]
    EmptyResponse,
    #[error("unparseable backend payload: {0}")]
    Parse(String),
}
