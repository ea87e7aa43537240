use crate::{classifier::Platform, Result};
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fmt::{self, Write as FmtWrite};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// region:        --- Models

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MalformedSubdomain,
    NoAlias,
    ResolutionFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "cause", rename_all = "snake_case")]
pub enum Verdict {
    Vulnerable,
    NotVulnerable,
    Skipped(SkipReason),
    Error(String),
}

/// How much a `Vulnerable` verdict can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A platform-specific probe fired.
    Likely,
    /// Only the generic fallback fired; the service may still be active.
    Possible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub subdomain: String,
    pub alias: Option<String>,
    pub platform: Option<Platform>,
    pub verdict: Verdict,
    pub confidence: Option<Confidence>,
    pub notes: Vec<String>,
}

impl Finding {
    pub fn new(subdomain: &str) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            alias: None,
            platform: None,
            verdict: Verdict::Skipped(SkipReason::NoAlias),
            confidence: None,
            notes: Vec::new(),
        }
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn skip(mut self, reason: SkipReason, note: impl Into<String>) -> Self {
        self.note(note);
        self.verdict = Verdict::Skipped(reason);
        self
    }

    pub fn is_vulnerable(&self) -> bool {
        self.verdict == Verdict::Vulnerable
    }
}

/// One engine run, as handed to the exporters.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self {
            generated_at: OffsetDateTime::now_utc(),
            findings,
        }
    }

    pub fn vulnerable_count(&self) -> usize {
        self.findings.iter().filter(|finding| finding.is_vulnerable()).count()
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedSubdomain => write!(f, "not a valid subdomain"),
            SkipReason::NoAlias => write!(f, "no CNAME record"),
            SkipReason::ResolutionFailure(err) => write!(f, "CNAME lookup failed: {err}"),
        }
    }
}

// endregion:     --- Models

// region:        --- Terminal output

pub fn summary_line(finding: &Finding) -> String {
    let subdomain = &finding.subdomain;
    match (&finding.verdict, finding.confidence) {
        (Verdict::Vulnerable, Some(Confidence::Possible)) => format!(
            "{subdomain} may be vulnerable to a subdomain takeover attack. Please check that the service is still active."
        ),
        (Verdict::Vulnerable, _) => format!(
            "{subdomain} is likely VULNERABLE to a subdomain takeover attack! URGENT ACTION IS RECOMMENDED!"
        ),
        (Verdict::NotVulnerable, _) if finding.platform == Some(Platform::Generic) => {
            format!("{subdomain} is unlikely to be vulnerable to a subdomain takeover attack.")
        }
        (Verdict::NotVulnerable, _) => {
            format!("{subdomain} is not vulnerable to a subdomain takeover attack.")
        }
        (Verdict::Skipped(reason), _) => format!("{subdomain} skipped: {reason}"),
        (Verdict::Error(err), _) => format!("{subdomain} could not be tested: {err}"),
    }
}

pub fn print_findings(findings: &[Finding]) {
    for finding in findings {
        println!("Analysing subdomain {}...", finding.subdomain);
        for note in &finding.notes {
            println!(" - {}", note);
        }
        println!("{}\n", summary_line(finding));
    }
}

// endregion:     --- Terminal output

// region:        --- Exporting utils

pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        Ok(false)
    } else {
        fs::create_dir_all(dir)?;
        Ok(true)
    }
}

pub fn export_to_json(report: &ScanReport, path: &Path) -> Result<()> {
    let json = to_string_pretty(report)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn render_markdown(report: &ScanReport) -> Result<String> {
    let mut md_content = String::new();
    writeln!(&mut md_content, "# Subdomain takeover report")?;
    writeln!(&mut md_content)?;
    writeln!(
        &mut md_content,
        "*Generated at {}*",
        report.generated_at.format(&Rfc3339)?
    )?;

    writeln!(&mut md_content)?;
    writeln!(
        &mut md_content,
        "{} subdomains tested, {} flagged as vulnerable.",
        report.findings.len(),
        report.vulnerable_count()
    )?;

    for finding in &report.findings {
        writeln!(&mut md_content)?;
        writeln!(&mut md_content, "## {}", finding.subdomain)?;
        writeln!(&mut md_content)?;
        if let Some(alias) = &finding.alias {
            writeln!(&mut md_content, "- Alias: `{}`", alias)?;
        }
        if let Some(platform) = finding.platform {
            writeln!(&mut md_content, "- Platform: {}", platform)?;
        }
        writeln!(&mut md_content, "- Result: **{}**", summary_line(finding))?;

        if finding.notes.is_empty() {
            continue;
        }
        writeln!(&mut md_content)?;
        writeln!(&mut md_content, "Notes:")?;
        writeln!(&mut md_content)?;
        for note in &finding.notes {
            writeln!(&mut md_content, "- {}", note)?;
        }
    }

    Ok(md_content)
}

pub fn export_to_markdown(report: &ScanReport, path: &Path) -> Result<()> {
    let md_content = render_markdown(report)?;
    let mut file = File::create(path)?;
    file.write_all(md_content.as_bytes())?;
    Ok(())
}

// endregion:     --- Exporting utils
