use crate::{Error, Result};
use clap::ArgMatches;
use std::time::Duration;

// region:        --- Constants

// timeouts
pub const HTTP_REQUEST_TIMEOUT_MS: u64 = 7500;
pub const RESOLVE_DNS_TIMEOUT_MS: u64 = 4000;
pub const RESOLVE_DNS_ATTEMPTS: usize = 2;
// one existence query (all attempts) plus one HTTP request must fit
pub const PROBE_TIMEOUT_MS: u64 = 16000;

// concurrency numbers
pub const SUBDOMAINS_CONCURRENCY: usize = 10;

// endregion:     --- Constants

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Both,
    None,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "md" => Ok(Self::Markdown),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            other => Err(Error::CliUsage(format!("Unknown output format: {other}"))),
        }
    }

    pub fn wants_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn wants_markdown(&self) -> bool {
        matches!(self, Self::Markdown | Self::Both)
    }
}

/// Knobs of one engine run. Everything comes from the command line.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub concurrency: usize,
    pub probe_timeout: Duration,
    pub http_timeout: Duration,
    pub dns_timeout: Duration,
    pub output: OutputFormat,
    pub save_logs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: SUBDOMAINS_CONCURRENCY,
            probe_timeout: Duration::from_millis(PROBE_TIMEOUT_MS),
            http_timeout: Duration::from_millis(HTTP_REQUEST_TIMEOUT_MS),
            dns_timeout: Duration::from_millis(RESOLVE_DNS_TIMEOUT_MS),
            output: OutputFormat::Both,
            save_logs: false,
        }
    }
}

impl ScanConfig {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let mut config = Self::default();

        if let Some(concurrency) = args.get_one::<usize>("concurrency") {
            config.concurrency = *concurrency;
        }
        if let Some(ms) = args.get_one::<u64>("probe-timeout") {
            config.probe_timeout = Duration::from_millis(*ms);
        }
        if let Some(ms) = args.get_one::<u64>("http-timeout") {
            config.http_timeout = Duration::from_millis(*ms);
        }
        if let Some(ms) = args.get_one::<u64>("dns-timeout") {
            config.dns_timeout = Duration::from_millis(*ms);
        }
        if let Some(format) = args.get_one::<String>("output") {
            config.output = OutputFormat::parse(format)?;
        }
        config.save_logs = args.get_flag("logs");

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidConfig("concurrency must be at least 1".into()));
        }

        let timeouts = [
            ("probe", self.probe_timeout),
            ("http", self.http_timeout),
            ("dns", self.dns_timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, timeout)| timeout.is_zero()) {
            return Err(Error::InvalidConfig(format!("{name} timeout must be non-zero")));
        }

        // the DNS and HTTP clients time out before the probe timer does
        let budget = self.dns_budget() + self.http_timeout;
        if self.probe_timeout < budget {
            return Err(Error::InvalidConfig(format!(
                "probe timeout ({}ms) must cover dns ({}ms x {} attempts) + http ({}ms)",
                self.probe_timeout.as_millis(),
                self.dns_timeout.as_millis(),
                RESOLVE_DNS_ATTEMPTS,
                self.http_timeout.as_millis()
            )));
        }

        Ok(())
    }

    /// Worst case for one DNS query, retries included.
    pub fn dns_budget(&self) -> Duration {
        self.dns_timeout * RESOLVE_DNS_ATTEMPTS as u32
    }
}
