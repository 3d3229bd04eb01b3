mod error;
mod tle_client;

pub use error::FetchError;
pub use tle_client::{unavailable_tle_text, TleClient, TleLines, TleResponse};
