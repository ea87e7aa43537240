use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

// List of Azure service domains:
// https://learn.microsoft.com/en-us/azure/security/fundamentals/azure-domains
pub const GITHUB_PAGES_SUFFIX: &str = "github.io";
pub const AZURE_FILES_SUFFIX: &str = "file.core.windows.net";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    GitHubPages,
    AzureFiles,
    Generic,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::GitHubPages => "GitHub Pages",
            Platform::AzureFiles => "Azure Files",
            Platform::Generic => "Generic",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuffixRule {
    pub suffix: &'static str,
    pub platform: Platform,
}

pub const SUFFIX_RULES: &[SuffixRule] = &[
    SuffixRule {
        suffix: GITHUB_PAGES_SUFFIX,
        platform: Platform::GitHubPages,
    },
    SuffixRule {
        suffix: AZURE_FILES_SUFFIX,
        platform: Platform::AzureFiles,
    },
];

/// Maps an alias to the platform owning its zone.
///
/// Rules are checked once at construction: no suffix may end with another one,
/// so the order they are evaluated in never changes the answer.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<SuffixRule>,
}

impl Classifier {
    pub fn new(rules: &[SuffixRule]) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.suffix.is_empty() {
                return Err(Error::InvalidSuffixTable(format!(
                    "empty suffix for {}",
                    rule.platform
                )));
            }
            if rule.suffix != rule.suffix.to_ascii_lowercase() {
                return Err(Error::InvalidSuffixTable(format!(
                    "suffix {:?} must be lowercase",
                    rule.suffix
                )));
            }
            if rule.platform == Platform::Generic {
                return Err(Error::InvalidSuffixTable(format!(
                    "suffix {:?} maps to the fallback platform",
                    rule.suffix
                )));
            }

            for other in &rules[i + 1..] {
                if rule.suffix.ends_with(other.suffix) || other.suffix.ends_with(rule.suffix) {
                    return Err(Error::InvalidSuffixTable(format!(
                        "suffixes {:?} ({}) and {:?} ({}) overlap",
                        rule.suffix, rule.platform, other.suffix, other.platform
                    )));
                }
            }
        }

        Ok(Self {
            rules: rules.to_vec(),
        })
    }

    pub fn classify(&self, alias: &str) -> Platform {
        let alias = alias.trim_end_matches('.').to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| alias.ends_with(rule.suffix))
            .map(|rule| rule.platform)
            .unwrap_or(Platform::Generic)
    }

    pub fn rules(&self) -> &[SuffixRule] {
        &self.rules
    }

    pub fn suffixes_for(&self, platform: Platform) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|rule| rule.platform == platform)
            .map(|rule| rule.suffix)
            .collect()
    }
}
