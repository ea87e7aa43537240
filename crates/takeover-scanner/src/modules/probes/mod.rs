pub mod azure_files;
pub mod generic;
pub mod github_account;
pub mod github_pages;

use super::Module;
use crate::dns::Resolve;
use crate::http::Fetch;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub const GITHUB_HOST: &str = "www.github.com";

/// What a single probe observed. The message is stage commentary for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Vulnerable(String),
    NotVulnerable(String),
    Inconclusive(String),
}

/// Network capabilities handed to every probe.
#[derive(Clone)]
pub struct Network {
    pub dns: Arc<dyn Resolve>,
    pub http: Arc<dyn Fetch>,
}

impl Network {
    pub fn new(dns: Arc<dyn Resolve>, http: Arc<dyn Fetch>) -> Self {
        Self { dns, http }
    }
}

#[async_trait]
pub trait Probe: Module + Send + Sync {
    /// `Err` means the probe could not reach a decision; the engine reports it as such.
    async fn decide(&self, net: &Network, alias: &str) -> Result<Signal>;
}
