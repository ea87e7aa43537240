pub mod probes;

use self::probes::azure_files::AzureFilesDangling;
use self::probes::generic::GenericDangling;
use self::probes::github_account::GitHubAccountDeleted;
use self::probes::github_pages::GitHubPagesMissing;
use self::probes::Probe;
use crate::classifier::{Classifier, Platform};
use crate::{Error, Result};

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

pub type ProbeChain = Vec<Box<dyn Probe>>;

/// Platform -> ordered probe chain.
///
/// The Generic chain is required to build a registry at all, so every platform
/// resolves to some chain. Built once at startup, read-only afterwards.
pub struct ProbeRegistry {
    generic: ProbeChain,
    platforms: Vec<(Platform, ProbeChain)>,
}

impl ProbeRegistry {
    pub fn new(generic: ProbeChain) -> Result<Self> {
        if generic.is_empty() {
            return Err(Error::InvalidRegistry("empty Generic probe chain".into()));
        }
        Ok(Self {
            generic,
            platforms: Vec::new(),
        })
    }

    pub fn register(mut self, platform: Platform, chain: ProbeChain) -> Result<Self> {
        if platform == Platform::Generic {
            return Err(Error::InvalidRegistry(
                "Generic chain is set at construction".into(),
            ));
        }
        if chain.is_empty() {
            return Err(Error::InvalidRegistry(format!("empty probe chain for {platform}")));
        }
        if self.platforms.iter().any(|(known, _)| *known == platform) {
            return Err(Error::InvalidRegistry(format!("{platform} registered twice")));
        }

        self.platforms.push((platform, chain));
        Ok(self)
    }

    pub fn probe_for(&self, platform: Platform) -> &[Box<dyn Probe>] {
        self.platforms
            .iter()
            .find(|(known, _)| *known == platform)
            .map(|(_, chain)| chain.as_slice())
            .unwrap_or(self.generic.as_slice())
    }

    /// Every registered chain, Generic last.
    pub fn entries(&self) -> Vec<(Platform, &[Box<dyn Probe>])> {
        self.platforms
            .iter()
            .map(|(platform, chain)| (*platform, chain.as_slice()))
            .chain(std::iter::once((Platform::Generic, self.generic.as_slice())))
            .collect()
    }

    pub fn is_registered(&self, platform: Platform) -> bool {
        platform == Platform::Generic || self.platforms.iter().any(|(known, _)| *known == platform)
    }
}

pub fn default_registry() -> Result<ProbeRegistry> {
    ProbeRegistry::new(vec![Box::new(GenericDangling::new())])?
        .register(
            Platform::GitHubPages,
            vec![
                Box::new(GitHubPagesMissing::new()),
                Box::new(GitHubAccountDeleted::new()),
            ],
        )?
        .register(Platform::AzureFiles, vec![Box::new(AzureFilesDangling::new())])
}

pub fn display_all(classifier: &Classifier, registry: &ProbeRegistry) {
    println!("\nPlatforms and probe chains");
    for (platform, chain) in registry.entries() {
        let suffixes = classifier.suffixes_for(platform);
        if suffixes.is_empty() {
            println!("\n{} (fallback)", platform);
        } else {
            println!("\n{} ({})", platform, suffixes.join(", "));
        }
        for module in chain {
            println!("- {:30}{}", module.name(), module.description());
        }
    }
}
