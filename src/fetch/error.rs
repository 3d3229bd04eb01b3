use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("TLE for catalog number {catalog_id} has an empty {field}")]
    EmptyLine {
        catalog_id: u32,
        field: &'static str,
    },
}
