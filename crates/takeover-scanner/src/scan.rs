use crate::classifier::{Classifier, Platform};
use crate::config::ScanConfig;
use crate::dns::AliasLookup;
use crate::model::{Confidence, Finding, SkipReason, Verdict};
use crate::modules::probes::{Network, Probe, Signal};
use crate::modules::{Module, ProbeRegistry};
use crate::{Error, Result};
use futures::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Cheap proxy for "has a root domain and at least one label".
pub fn is_well_formed(subdomain: &str) -> bool {
    subdomain.matches('.').count() >= 2
}

pub struct Engine {
    classifier: Arc<Classifier>,
    registry: Arc<ProbeRegistry>,
    net: Network,
    concurrency: usize,
    probe_timeout: Duration,
}

// region:        --- Constructors

impl Engine {
    pub fn new(
        classifier: Arc<Classifier>,
        registry: Arc<ProbeRegistry>,
        net: Network,
        config: &ScanConfig,
    ) -> Result<Self> {
        config.validate()?;

        if let Some(rule) = classifier
            .rules()
            .iter()
            .find(|rule| !registry.is_registered(rule.platform))
        {
            return Err(Error::InvalidRegistry(format!(
                "no probe chain for {} ({})",
                rule.platform, rule.suffix
            )));
        }

        Ok(Self {
            classifier,
            registry,
            net,
            concurrency: config.concurrency,
            probe_timeout: config.probe_timeout,
        })
    }
}

// endregion:     --- Constructors

// region:        --- Engine passes

impl Engine {
    /// One finding per input, in input order. Never aborts on a single subdomain.
    #[instrument(name = "takeover", level = "info", skip_all)]
    pub async fn process_all(&self, subdomains: Vec<String>) -> Vec<Finding> {
        info!("{} subdomains to check", subdomains.len());

        let findings: Vec<Finding> = stream::iter(subdomains.iter())
            .map(|subdomain| self.process(subdomain))
            .buffered(self.concurrency)
            .collect()
            .await;

        let vulnerable = findings.iter().filter(|finding| finding.is_vulnerable()).count();
        info!("{} subdomains flagged as vulnerable", vulnerable);
        findings
    }

    #[instrument(name = "subdomain", level = "info", skip(self))]
    pub async fn process(&self, subdomain: &str) -> Finding {
        let mut finding = Finding::new(subdomain);

        // -- Start -> Validated
        if !is_well_formed(subdomain) {
            debug!("Malformed subdomain");
            return finding.skip(
                SkipReason::MalformedSubdomain,
                format!("{subdomain} is not a valid subdomain"),
            );
        }

        // -- Validated -> Resolved
        let alias = match self.resolve_alias(subdomain).await {
            AliasLookup::Resolved(alias) => alias,
            AliasLookup::Absent => {
                return finding.skip(
                    SkipReason::NoAlias,
                    format!("Record for subdomain {subdomain} does not exist or is not of CNAME type"),
                );
            }
            // Resolver failures are skipped like a missing record, only the reason differs.
            AliasLookup::TransientError(err) => {
                warn!("CNAME lookup failed: {}", err);
                return finding.skip(
                    SkipReason::ResolutionFailure(err),
                    "CNAME lookup failed, check the network connection",
                );
            }
        };

        // -- Resolved -> Classified
        let platform = self.classifier.classify(&alias);
        finding.note(match platform {
            Platform::Generic => format!(
                "Subdomain points to a service at {alias}, which currently cannot be accurately tested"
            ),
            _ => format!("Subdomain points to a {platform} service at {alias}"),
        });
        finding.alias = Some(alias.clone());
        finding.platform = Some(platform);

        // -- Classified -> Probed
        let chain = self.registry.probe_for(platform);
        finding.verdict = self.run_chain(chain, &alias, &mut finding.notes).await;

        if finding.verdict == Verdict::Vulnerable {
            finding.confidence = Some(match platform {
                Platform::Generic => Confidence::Possible,
                _ => Confidence::Likely,
            });
        }

        info!("Verdict: {:?}", finding.verdict);
        finding
    }
}

// endregion:     --- Engine passes

// region:        --- Engine stages

impl Engine {
    async fn resolve_alias(&self, subdomain: &str) -> AliasLookup {
        match timeout(self.probe_timeout, self.net.dns.resolve_alias(subdomain)).await {
            Ok(lookup) => lookup,
            Err(_) => AliasLookup::TransientError(format!(
                "timed out after {}ms",
                self.probe_timeout.as_millis()
            )),
        }
    }

    /// Vulnerable as soon as one probe says so. Otherwise NotVulnerable only if
    /// every probe reached a decision.
    async fn run_chain(
        &self,
        chain: &[Box<dyn Probe>],
        alias: &str,
        notes: &mut Vec<String>,
    ) -> Verdict {
        let mut inconclusive: Vec<String> = Vec::new();

        for probe in chain {
            match self.run_probe(probe.as_ref(), alias).await {
                Signal::Vulnerable(note) => {
                    notes.push(note);
                    return Verdict::Vulnerable;
                }
                Signal::NotVulnerable(note) => notes.push(note),
                Signal::Inconclusive(reason) => {
                    notes.push(format!("{}: {}", probe.name(), reason));
                    inconclusive.push(reason);
                }
            }
        }

        if inconclusive.is_empty() {
            Verdict::NotVulnerable
        } else {
            Verdict::Error(inconclusive.join("; "))
        }
    }

    async fn run_probe(&self, probe: &dyn Probe, alias: &str) -> Signal {
        match timeout(self.probe_timeout, probe.decide(&self.net, alias)).await {
            Ok(Ok(signal)) => signal,
            Ok(Err(err)) => {
                warn!("{} failed: {}", probe.name(), err);
                Signal::Inconclusive(format!("network failure ({err})"))
            }
            Err(_) => {
                warn!("{} timed out", probe.name());
                Signal::Inconclusive(format!(
                    "timed out after {}ms",
                    self.probe_timeout.as_millis()
                ))
            }
        }
    }
}

// endregion:     --- Engine stages
