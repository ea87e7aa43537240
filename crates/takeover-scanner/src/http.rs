use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

#[async_trait]
pub trait Fetch: Send + Sync {
    /// Sends a GET to `url` and returns the final status code.
    async fn status(&self, url: &str) -> Result<u16>;
}

/// Process-wide pooled client shared by every probe.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        debug!("HTTP Client created: {:?}", client);
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(name = "HTTP_request", level = "info", skip_all, fields(url = url))]
    async fn status(&self, url: &str) -> Result<u16> {
        info!("Sending request");
        match self.client.get(url).send().await {
            Ok(res) => {
                info!("Receive with status: {}", res.status());
                debug!("Response: {:?}", res);
                Ok(res.status().as_u16())
            }
            Err(err) => {
                error!("Reason: {}", err);
                Err(Error::Reqwest(err))
            }
        }
    }
}
