use super::{Network, Probe, Signal};
use crate::{modules::Module, Result};
use async_trait::async_trait;
use tracing::instrument;

// region:        --- Module info

/// Azure only keeps a DNS record for storage accounts that exist. Deleted or
/// never-created accounts have no record under `file.core.windows.net`.
pub struct AzureFilesDangling {}

impl AzureFilesDangling {
    pub fn new() -> Self {
        Self {}
    }
}

impl Module for AzureFilesDangling {
    fn name(&self) -> String {
        "probes/azure_files".to_string()
    }
    fn description(&self) -> String {
        "Check the Azure Files endpoint still has a DNS record".to_string()
    }
}

// endregion:     --- Module info

#[async_trait]
impl Probe for AzureFilesDangling {
    #[instrument(name = "check", level = "info", fields(module = self.name()), skip_all)]
    async fn decide(&self, net: &Network, alias: &str) -> Result<Signal> {
        if net.dns.exists(alias).await {
            Ok(Signal::NotVulnerable(format!("Target domain {alias} exists")))
        } else {
            Ok(Signal::Vulnerable(format!(
                "Target domain {alias} does not exist"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockFetch, MockResolver};

    #[tokio::test]
    async fn decision_follows_dns_existence_only() {
        let (net, dns, http) = MockResolver::new()
            .with_existing("live.file.core.windows.net")
            .network(MockFetch::new());
        let probe = AzureFilesDangling::new();

        let gone = probe.decide(&net, "acct.file.core.windows.net").await.expect("decide");
        let live = probe.decide(&net, "live.file.core.windows.net").await.expect("decide");

        assert!(matches!(gone, Signal::Vulnerable(_)));
        assert!(matches!(live, Signal::NotVulnerable(_)));
        assert_eq!(dns.exists_calls().len(), 2);
        assert!(http.calls().is_empty());
    }
}
