//! Blocklist acquisition: fetch hosts-format sources and emit a rule-list
//! document.

use std::path::Path;
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::hosts;
use crate::payload::RuleList;
use crate::{Error, Result};

/// Timeout applied to each source fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A named hosts-format blocklist source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Short name used in log output
    pub name: String,
    /// URL of the hosts-format list
    pub url: String,
}

impl Source {
    /// Create a new source.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Fetches hosts sources and accumulates unique blocked domains.
pub struct BlocklistFetcher {
    client: reqwest::blocking::Client,
}

impl BlocklistFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the raw content of a single source.
    pub fn fetch(&self, source: &Source) -> Result<String> {
        log::info!("Downloading {}: {}", source.name, source.url);

        let response = self.client.get(&source.url).send()?;
        if !response.status().is_success() {
            return Err(Error::Status {
                url: source.url.clone(),
                code: response.status().as_u16(),
            });
        }

        Ok(response.text()?)
    }

    /// Collect the union of qualifying domains across all sources.
    ///
    /// Sources are fetched in order; any fetch failure aborts the run.
    pub fn collect(&self, sources: &[Source]) -> Result<RuleList> {
        let mut rules = RuleList::new();

        for source in sources {
            let content = self.fetch(source)?;
            let domains = hosts::parse(&content);
            log::info!("{}: {} entries", source.name, domains.len());
            rules.extend(domains);
        }

        ensure_nonempty(rules)
    }

    /// Run the full acquisition pipeline: fetch, dedupe, write.
    ///
    /// Returns the number of unique domains written. Nothing is written
    /// when no domains were collected.
    pub fn generate(&self, sources: &[Source], output: &Path) -> Result<usize> {
        let rules = self.collect(sources)?;
        rules.write_to(output, Local::now())?;
        log::info!("Wrote {} unique rules to {}", rules.len(), output.display());
        Ok(rules.len())
    }
}

/// An empty collection is a pipeline failure, not an empty document.
fn ensure_nonempty(rules: RuleList) -> Result<RuleList> {
    if rules.is_empty() {
        return Err(Error::EmptyBlocklist);
    }
    Ok(rules)
}
