use super::{Network, Probe, Signal};
use crate::{modules::Module, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

// region:        --- Module info

pub struct GenericDangling {}

impl GenericDangling {
    pub fn new() -> Self {
        Self {}
    }
}

impl Module for GenericDangling {
    fn name(&self) -> String {
        "probes/generic".to_string()
    }
    fn description(&self) -> String {
        "Check the alias still resolves and does not answer 404".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl Probe for GenericDangling {
    #[instrument(name = "check", level = "info", fields(module = self.name()), skip_all)]
    async fn decide(&self, net: &Network, alias: &str) -> Result<Signal> {
        if !net.dns.exists(alias).await {
            return Ok(Signal::Vulnerable(format!(
                "Target domain {alias} does not exist"
            )));
        }

        // only an explicit 404 flips this fallback to vulnerable
        match net.http.status(&format!("http://{alias}")).await {
            Ok(404) => Ok(Signal::Vulnerable(format!(
                "Target domain {alias} was accessible, but not found (404 returned)"
            ))),
            Ok(status) => {
                debug!("{} answered {}", alias, status);
                Ok(Signal::NotVulnerable(format!(
                    "Target domain {alias} exists ({status} returned)"
                )))
            }
            Err(err) => {
                warn!("{} resolves but HTTP failed: {}", alias, err);
                Ok(Signal::NotVulnerable(format!(
                    "Target domain {alias} exists (HTTP request failed, no 404 seen)"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFetch, MockResolver};

    #[tokio::test]
    async fn missing_dns_name_is_vulnerable_without_http() {
        let (net, dns, http) = MockResolver::new().network(MockFetch::new());

        let signal = GenericDangling::new()
            .decide(&net, "service.unknownhost.example")
            .await
            .expect("generic probe never errors");

        assert!(matches!(signal, Signal::Vulnerable(_)));
        assert_eq!(dns.exists_calls(), vec!["service.unknownhost.example"]);
        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn existing_name_answering_404_is_vulnerable() {
        let (net, _, http) = MockResolver::new()
            .with_existing("old.herokuapp.com")
            .network(MockFetch::new().with_status("http://old.herokuapp.com", 404));

        let signal = GenericDangling::new()
            .decide(&net, "old.herokuapp.com")
            .await
            .expect("generic probe never errors");

        assert!(matches!(signal, Signal::Vulnerable(msg) if msg.contains("404")));
        assert_eq!(http.calls(), vec!["http://old.herokuapp.com"]);
    }

    #[tokio::test]
    async fn live_or_unreachable_site_is_not_vulnerable() {
        let (net, _, _) = MockResolver::new()
            .with_existing("live.example.net")
            .with_existing("down.example.net")
            .network(
                MockFetch::new()
                    .with_status("http://live.example.net", 200)
                    .with_failure("http://down.example.net"),
            );
        let probe = GenericDangling::new();

        let live = probe.decide(&net, "live.example.net").await.expect("decide");
        let down = probe.decide(&net, "down.example.net").await.expect("decide");

        assert!(matches!(live, Signal::NotVulnerable(_)));
        assert!(matches!(down, Signal::NotVulnerable(_)));
    }
}
