use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::fetch::error::FetchError;

/// Body returned by the TLE lookup service. Only the element lines are
/// required.
#[derive(Debug, Clone, Deserialize)]
pub struct TleResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "satelliteId")]
    pub satellite_id: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    pub line1: String,
    pub line2: String,
}

/// The two element lines of one satellite, plus its name if the source had one.
#[derive(Debug, Clone, PartialEq)]
pub struct TleLines {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl TleLines {
    pub fn from_response(catalog_id: u32, response: TleResponse) -> Result<Self, FetchError> {
        if response.line1.trim().is_empty() {
            return Err(FetchError::EmptyLine {
                catalog_id,
                field: "line1",
            });
        }
        if response.line2.trim().is_empty() {
            return Err(FetchError::EmptyLine {
                catalog_id,
                field: "line2",
            });
        }
        Ok(Self {
            name: response.name.filter(|n| !n.trim().is_empty()),
            line1: response.line1,
            line2: response.line2,
        })
    }

    /// Three-line TLE text. `fallback_name` is used when the source had none.
    pub fn to_tle_text(&self, fallback_name: &str) -> String {
        let name = self.name.as_deref().unwrap_or(fallback_name);
        format!("{}\n{}\n{}", name, self.line1, self.line2)
    }
}

/// Three-line text standing in for a TLE that could not be retrieved. It never
/// parses.
pub fn unavailable_tle_text(name: &str) -> String {
    format!("{}\n\n\n", name)
}

pub struct TleClient {
    client: Client,
    base_url: String,
}

impl TleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, catalog_id: u32) -> String {
        format!("{}/{}", self.base_url, catalog_id)
    }

    pub async fn fetch(&self, catalog_id: u32) -> Result<TleLines, FetchError> {
        let url = self.url_for(catalog_id);
        log::debug!("fetching TLE from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<TleResponse>()
            .await?;

        if let Some(date) = &response.date {
            log::info!("received TLE for {} dated {}", catalog_id, date);
        }
        TleLines::from_response(catalog_id, response)
    }

    /// Fetches the TLE, logging and swallowing any failure.
    pub async fn fetch_or_log(&self, catalog_id: u32) -> Option<TleLines> {
        match self.fetch(catalog_id).await {
            Ok(lines) => Some(lines),
            Err(e) => {
                log::error!("There was a problem fetching the TLE for {}: {}", catalog_id, e);
                None
            }
        }
    }
}
