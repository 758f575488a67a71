//! Rule-list document model and writer.
//!
//! A rule-list document is the Clash rule-provider `payload:` dialect: a
//! comment header carrying the generation timestamp and entry count, then
//! one suffix-match rule per line.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::Result;

/// Label written into the document header.
const CONTENT_LABEL: &str = "Custom Block List";

/// An ordered set of suffix-match block rules.
///
/// Domains are unique and lexicographically sorted, so the same input set
/// always renders the same body regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleList {
    domains: BTreeSet<String>,
}

impl RuleList {
    /// Create an empty rule list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single domain. Duplicates are ignored.
    pub fn insert(&mut self, domain: impl Into<String>) {
        self.domains.insert(domain.into());
    }

    /// Add all domains from an iterator.
    pub fn extend<I>(&mut self, domains: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.domains.extend(domains);
    }

    /// Number of unique domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// True when no domains have been collected.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Iterate over the domains in lexicographic order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// Render the rule-list document.
    pub fn render(&self, generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        out.push_str("payload:\n");
        let _ = writeln!(out, "  # Content: {}", CONTENT_LABEL);
        let _ = writeln!(out, "  # Updated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "  # Count: {}", self.domains.len());
        for domain in &self.domains {
            let _ = writeln!(out, "  - DOMAIN-SUFFIX,{}", domain);
        }
        out
    }

    /// Write the rendered document, creating parent directories as needed.
    pub fn write_to(&self, path: &Path, generated_at: DateTime<Local>) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(generated_at))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_deduplicates_and_sorts() {
        let mut rules = RuleList::new();
        rules.insert("b.example.com");
        rules.insert("a.example.com");
        rules.insert("b.example.com");

        assert_eq!(rules.len(), 2);
        let domains: Vec<&str> = rules.domains().collect();
        assert_eq!(domains, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_render_format() {
        let mut rules = RuleList::new();
        rules.extend(vec!["ads.example.com".to_string(), "a.example.net".to_string()]);

        let doc = rules.render(fixed_time());
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], "payload:");
        assert_eq!(lines[1], "  # Content: Custom Block List");
        assert_eq!(lines[2], "  # Updated: 2024-03-01 12:30:00");
        assert_eq!(lines[3], "  # Count: 2");
        assert_eq!(lines[4], "  - DOMAIN-SUFFIX,a.example.net");
        assert_eq!(lines[5], "  - DOMAIN-SUFFIX,ads.example.com");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_render_is_order_stable() {
        let mut forward = RuleList::new();
        forward.extend(vec!["a.com".to_string(), "b.com".to_string(), "c.com".to_string()]);

        let mut reverse = RuleList::new();
        reverse.extend(vec!["c.com".to_string(), "b.com".to_string(), "a.com".to_string()]);

        assert_eq!(forward.render(fixed_time()), reverse.render(fixed_time()));
    }

    #[test]
    fn test_empty_list_renders_header_only() {
        let rules = RuleList::new();
        let doc = rules.render(fixed_time());
        assert!(doc.contains("# Count: 0"));
        assert!(!doc.contains("DOMAIN-SUFFIX"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app_ad.yaml");

        let mut rules = RuleList::new();
        rules.insert("ads.example.com");
        rules.write_to(&path, fixed_time()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("payload:\n"));
        assert!(written.contains("  - DOMAIN-SUFFIX,ads.example.com\n"));
    }
}
