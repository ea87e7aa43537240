//! Deterministic DNS/HTTP doubles that record every call.

use crate::dns::{AliasLookup, Resolve};
use crate::http::Fetch;
use crate::modules::probes::Network;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// region:        --- Resolver

#[derive(Default)]
pub struct MockResolver {
    aliases: HashMap<String, AliasLookup>,
    existing: HashSet<String>,
    delay: Option<Duration>,
    alias_delay: Option<Duration>,
    alias_calls: Mutex<Vec<String>>,
    exists_calls: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, subdomain: &str, alias: &str) -> Self {
        self.aliases
            .insert(subdomain.to_string(), AliasLookup::Resolved(alias.to_string()));
        self
    }

    pub fn with_lookup(mut self, subdomain: &str, lookup: AliasLookup) -> Self {
        self.aliases.insert(subdomain.to_string(), lookup);
        self
    }

    pub fn with_existing(mut self, hostname: &str) -> Self {
        self.existing.insert(hostname.to_string());
        self
    }

    /// Every `exists` answer waits this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every CNAME answer waits this long first.
    pub fn with_alias_delay(mut self, delay: Duration) -> Self {
        self.alias_delay = Some(delay);
        self
    }

    pub fn network(self, http: MockFetch) -> (Network, Arc<MockResolver>, Arc<MockFetch>) {
        let dns = Arc::new(self);
        let http = Arc::new(http);
        let net = Network::new(dns.clone(), http.clone());
        (net, dns, http)
    }

    pub fn alias_calls(&self) -> Vec<String> {
        self.alias_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn exists_calls(&self) -> Vec<String> {
        self.exists_calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Resolve for MockResolver {
    async fn resolve_alias(&self, subdomain: &str) -> AliasLookup {
        if let Ok(mut calls) = self.alias_calls.lock() {
            calls.push(subdomain.to_string());
        }
        if let Some(delay) = self.alias_delay {
            tokio::time::sleep(delay).await;
        }
        self.aliases
            .get(subdomain)
            .cloned()
            .unwrap_or(AliasLookup::Absent)
    }

    async fn exists(&self, hostname: &str) -> bool {
        if let Ok(mut calls) = self.exists_calls.lock() {
            calls.push(hostname.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.existing.contains(hostname)
    }
}

// endregion:     --- Resolver

// region:        --- Fetch

/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct MockFetch {
    statuses: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.statuses.remove(url);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn status(&self, url: &str) -> Result<u16> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        self.statuses
            .get(url)
            .copied()
            .ok_or_else(|| Error::Unreachable(format!("connection refused: {url}")))
    }
}

// endregion:     --- Fetch
