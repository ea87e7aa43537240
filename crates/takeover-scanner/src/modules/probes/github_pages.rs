use super::{Network, Probe, Signal};
use crate::{modules::Module, Result};
use async_trait::async_trait;
use tracing::instrument;

// region:        --- Module info

pub struct GitHubPagesMissing {}

impl GitHubPagesMissing {
    pub fn new() -> Self {
        Self {}
    }
}

impl Module for GitHubPagesMissing {
    fn name(&self) -> String {
        "probes/github_pages".to_string()
    }
    fn description(&self) -> String {
        "Check the GitHub Pages site behind the alias is published".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl Probe for GitHubPagesMissing {
    #[instrument(name = "check", level = "info", fields(module = self.name()), skip_all)]
    async fn decide(&self, net: &Network, alias: &str) -> Result<Signal> {
        let status = net.http.status(&format!("http://{alias}")).await?;

        if status == 404 {
            return Ok(Signal::Vulnerable(format!(
                "GitHub Pages website at {alias} not found (404 returned)"
            )));
        }

        Ok(Signal::NotVulnerable(format!(
            "GitHub Pages website exists at {alias} ({status} returned)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFetch, MockResolver};

    #[tokio::test]
    async fn unpublished_site_is_vulnerable() {
        let (net, _, http) = MockResolver::new()
            .network(MockFetch::new().with_status("http://user123.github.io", 404));

        let signal = GitHubPagesMissing::new()
            .decide(&net, "user123.github.io")
            .await
            .expect("decide");

        assert!(matches!(signal, Signal::Vulnerable(_)));
        assert_eq!(http.calls(), vec!["http://user123.github.io"]);
    }

    #[tokio::test]
    async fn network_failure_is_an_error() {
        let (net, _, _) =
            MockResolver::new().network(MockFetch::new().with_failure("http://user123.github.io"));

        let result = GitHubPagesMissing::new().decide(&net, "user123.github.io").await;

        assert!(result.is_err());
    }
}
