use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The comment-count indicator is missing or contains no digits: {0:?}")]
    MalformedSummary(String),

    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Invalid header value in the site configuration: {0}")]
    SiteHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("Couldn't hand records to the sink writer.")]
    RuntimeSend,

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
