use crate::config::RESOLVE_DNS_ATTEMPTS;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};

/// Outcome of a CNAME query.
///
/// `Absent` covers NXDOMAIN and "name exists but has no CNAME". Everything else
/// the resolver can fail with (timeouts, SERVFAIL, socket errors) lands in
/// `TransientError`. The engine currently skips both, with distinct reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasLookup {
    Resolved(String),
    Absent,
    TransientError(String),
}

#[async_trait]
pub trait Resolve: Send + Sync {
    /// Canonical name the CNAME of `subdomain` points to, without the root label dot.
    async fn resolve_alias(&self, subdomain: &str) -> AliasLookup;

    /// Whether `hostname` has any record at all. Any failure counts as "no".
    async fn exists(&self, hostname: &str) -> bool;
}

// region:        --- Hickory resolver

pub struct DnsResolver {
    inner: Arc<TokioAsyncResolver>,
}

impl DnsResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = RESOLVE_DNS_ATTEMPTS;
        debug!("DNS resolver options: {:?}", opts);
        let dns_resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);

        debug!("DNS resolver created: {:?}", dns_resolver);
        Self {
            inner: Arc::new(dns_resolver),
        }
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    #[instrument(name = "resolve_alias", level = "debug", skip(self))]
    async fn resolve_alias(&self, subdomain: &str) -> AliasLookup {
        match self.inner.lookup(subdomain, RecordType::CNAME).await {
            Ok(lookup) => {
                let alias = lookup
                    .iter()
                    .find_map(|rdata| rdata.as_cname())
                    .map(|cname| strip_root_label(&cname.0.to_string()));

                match alias {
                    Some(alias) if !alias.is_empty() => {
                        debug!("CNAME -> {}", alias);
                        AliasLookup::Resolved(alias)
                    }
                    _ => AliasLookup::Absent,
                }
            }
            Err(err) => {
                debug!("{:?}", err);
                lookup_failure(&err)
            }
        }
    }

    #[instrument(name = "exists", level = "debug", skip(self))]
    async fn exists(&self, hostname: &str) -> bool {
        match self.inner.lookup(hostname, RecordType::ANY).await {
            Ok(lookup) => {
                debug!("{:?}", lookup);
                true
            }
            Err(err) => {
                debug!("{:?}", err);
                false
            }
        }
    }
}

// endregion:     --- Hickory resolver

fn lookup_failure(err: &ResolveError) -> AliasLookup {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => AliasLookup::Absent,
        _ => AliasLookup::TransientError(err.to_string()),
    }
}

pub fn strip_root_label(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_string()
}
