use crate::domain::ports::{RangeFetcher, RangeResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::Client;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues `Range: bytes=start-end` GETs and counts the body length.
#[derive(Debug, Clone)]
pub struct HttpRangeFetcher {
    client: Client,
}

impl HttpRangeFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RangeFetcher for HttpRangeFetcher {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<RangeResponse> {
        let response = self
            .client
            .get(url)
            .header(RANGE, format!("bytes={}-{}", start, end))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RangeResponse {
            status,
            bytes: body.len() as u64,
        })
    }
}
