mod classifier;
mod config;
mod dns;
mod error;
mod http;
#[cfg(test)]
mod mock;
mod model;
mod modules;
mod scan;
mod zone;

pub use error::{Error, Result};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use classifier::{Classifier, SUFFIX_RULES};
use config::ScanConfig;
use dns::DnsResolver;
use http::HttpFetcher;
use model::{ensure_dir, export_to_json, export_to_markdown, print_findings, ScanReport};
use modules::probes::Network;
use scan::Engine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const OUTPUT_DIR: &str = "output/takeover";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about("Detect dangling CNAME records exposing subdomains to takeover")
        .subcommand(Command::new("modules").about("List platforms and their probes"))
        .subcommand(
            with_scan_args(Command::new("check").about("Check a list of subdomains")).arg(
                Arg::new("subdomains")
                    .help("Subdomains to check, e.g. blog.example.com")
                    .value_name("SUBDOMAIN")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            ),
        )
        .subcommand(
            with_scan_args(
                Command::new("zone").about("Check every CNAME record of a BIND zone file"),
            )
            .arg(
                Arg::new("zone-file")
                    .help("BIND-compatible zone file")
                    .value_name("ZONE_FILE")
                    .value_parser(value_parser!(PathBuf))
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("root-domain")
                    .help("Root domain of the zone, e.g. example.com")
                    .value_name("ROOT_DOMAIN")
                    .required(true)
                    .index(2),
            ),
        )
        .arg_required_else_help(true)
        .get_matches();

    let classifier = Arc::new(Classifier::new(SUFFIX_RULES)?);
    let registry = Arc::new(modules::default_registry()?);

    match cli.subcommand() {
        Some(("modules", _)) => modules::display_all(&classifier, &registry),
        Some(("check", args)) => {
            let subdomains: Vec<String> = args
                .get_many::<String>("subdomains")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            run(args, || Ok(subdomains), classifier, registry).await?;
        }
        Some(("zone", args)) => {
            let (Some(zone_file), Some(root_domain)) = (
                args.get_one::<PathBuf>("zone-file"),
                args.get_one::<String>("root-domain"),
            ) else {
                return Err(Error::CliUsage("zone needs <ZONE_FILE> <ROOT_DOMAIN>".into()));
            };
            let collect = || zone::parse_zone_file(zone_file, root_domain);
            run(args, collect, classifier, registry).await?;
        }

        // fallback if a cmd is not handled (should not possible)
        _ => {
            error!("{:12} - Command not handled, exit program", "CLI ERROR");
            return Err(Error::CliUsage("Command not handled".into()));
        }
    }

    Ok(())
}

fn with_scan_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("concurrency")
                .short('c')
                .long("concurrency")
                .help("Subdomains checked at the same time")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("probe-timeout")
                .long("probe-timeout")
                .help("Timeout of a single probe, in milliseconds")
                .value_name("MS")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("http-timeout")
                .long("http-timeout")
                .help("HTTP request timeout, in milliseconds")
                .value_name("MS")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("dns-timeout")
                .long("dns-timeout")
                .help("DNS query timeout, in milliseconds")
                .value_name("MS")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("logs")
                .short('s')
                .long("logs")
                .action(ArgAction::SetTrue)
                .help("Save logs into a .log file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output format")
                .value_name("OUTPUT")
                .value_parser(["json", "md", "both", "none"])
                .default_value("both"),
        )
}

/// `collect` runs once logging is up, so zone parsing shows in the run logs.
async fn run(
    args: &ArgMatches,
    collect: impl FnOnce() -> Result<Vec<String>>,
    classifier: Arc<Classifier>,
    registry: Arc<modules::ProbeRegistry>,
) -> Result<()> {
    let config = ScanConfig::from_matches(args)?;

    // create filename
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let filename = format!("{}", timestamp);

    // create output dir
    let output_dir = Path::new(OUTPUT_DIR);
    ensure_dir(output_dir)?;

    init_tracing_subscriber(config.save_logs, output_dir, &filename);
    let subdomains = collect()?;

    let net = Network::new(
        Arc::new(DnsResolver::new(config.dns_timeout)),
        Arc::new(HttpFetcher::new(config.http_timeout)?),
    );
    let engine = Engine::new(classifier, registry, net, &config)?;

    info!("Checking {} subdomains (run_{})", subdomains.len(), timestamp);
    let report = ScanReport::new(engine.process_all(subdomains).await);
    print_findings(&report.findings);

    // write result
    if config.output.wants_json() {
        let json_path = output_dir.join(&filename).with_extension("json");
        export_to_json(&report, &json_path)?;
        info!("JSON report written to {}", json_path.display());
    }
    if config.output.wants_markdown() {
        let md_path = output_dir.join(&filename).with_extension("md");
        export_to_markdown(&report, &md_path)?;
        info!("Markdown report written to {}", md_path.display());
    }

    Ok(())
}

fn init_tracing_subscriber(save_logs_file: bool, output_dir: &Path, filename: &str) {
    // base for the subscriber
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_span_events(FmtSpan::CLOSE);

    if save_logs_file {
        let filename = format!("{}.log", filename);
        let file_appender = RollingFileAppender::new(Rotation::NEVER, output_dir, filename);
        let suscriber = subscriber
            .with_ansi(false)
            .with_file(false)
            .with_target(false)
            .with_writer(file_appender)
            .finish();

        // add log in terminal as an additional layer
        let stdout_layer = layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true)
            .with_file(false)
            .with_target(false);

        // init the subscriber
        tracing::subscriber::set_global_default(suscriber.with(stdout_layer))
            .expect("Unable to set global subscriber with 2 layer");
    } else {
        let suscriber = subscriber
            .with_ansi(true)
            .with_file(false)
            .with_target(false)
            .finish();

        // init the subscriber
        tracing::subscriber::set_global_default(suscriber)
            .expect("Unable to set global subscriber");
    }
}
