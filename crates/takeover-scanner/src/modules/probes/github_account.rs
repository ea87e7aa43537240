use super::{Network, Probe, Signal, GITHUB_HOST};
use crate::{modules::Module, Error, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

// region:        --- Module info

pub struct GitHubAccountDeleted {}

impl GitHubAccountDeleted {
    pub fn new() -> Self {
        Self {}
    }

    /// `user123.github.io` belongs to the `user123` account.
    pub fn username<'a>(&self, alias: &'a str) -> Option<&'a str> {
        alias.split('.').next().filter(|label| !label.is_empty())
    }
}

impl Module for GitHubAccountDeleted {
    fn name(&self) -> String {
        "probes/github_account".to_string()
    }
    fn description(&self) -> String {
        "Check the GitHub account owning the Pages site still exists".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl Probe for GitHubAccountDeleted {
    #[instrument(name = "check", level = "info", fields(module = self.name()), skip_all)]
    async fn decide(&self, net: &Network, alias: &str) -> Result<Signal> {
        let username = self
            .username(alias)
            .ok_or_else(|| Error::InvalidAlias(alias.to_string()))?;
        debug!("GitHub username: {}", username);

        let status = net
            .http
            .status(&format!("http://{GITHUB_HOST}/{username}"))
            .await?;

        if status == 404 {
            return Ok(Signal::Vulnerable(format!(
                "GitHub profile with username {username} not found (404 returned)"
            )));
        }

        Ok(Signal::NotVulnerable(format!(
            "GitHub profile with username {username} exists ({status} returned)"
        )))
    }
}
