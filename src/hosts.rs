//! Hosts-format blocklist parsing.

/// Sentinel addresses hosts blocklists use to null-route a domain.
pub const BLACKHOLE_ADDRS: [&str; 2] = ["0.0.0.0", "127.0.0.1"];

/// Extract blocked domains from hosts-format content.
///
/// A line yields a domain only when its first whitespace-separated token is
/// one of [`BLACKHOLE_ADDRS`] and a second token is present; the second
/// token is the domain. Blank lines and `#` comment lines are skipped.
/// Anything after the second token is ignored.
pub fn parse(content: &str) -> Vec<String> {
    let mut domains = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let addr = match tokens.next() {
            Some(a) => a,
            None => continue,
        };
        if !BLACKHOLE_ADDRS.contains(&addr) {
            continue;
        }

        if let Some(domain) = tokens.next() {
            domains.push(domain.to_string());
        }
    }

    domains
}
