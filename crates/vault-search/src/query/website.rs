//! Login URI comparison for `website:` predicates.

use std::net::IpAddr;

use regex::RegexBuilder;

use crate::types::UriMatchStrategy;

/// Tests a stored login URI against the website the user typed.
pub fn uri_matches(stored: &str, website: &str, strategy: UriMatchStrategy) -> bool {
    let stored = stored.trim();
    let website = website.trim();
    if stored.is_empty() || website.is_empty() {
        return false;
    }

    match strategy {
        UriMatchStrategy::Domain => match (base_domain(stored), base_domain(website)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        },
        UriMatchStrategy::Host => match (host_and_port(stored), host_and_port(website)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        },
        UriMatchStrategy::StartsWith => website
            .to_lowercase()
            .starts_with(&stored.to_lowercase()),
        UriMatchStrategy::Exact => website.to_lowercase() == stored.to_lowercase(),
        UriMatchStrategy::Regex => match RegexBuilder::new(stored).case_insensitive(true).build() {
            Ok(pattern) => pattern.is_match(website),
            Err(e) => {
                log::debug!("ignoring login URI with invalid regex: {}", e);
                false
            }
        },
        UriMatchStrategy::Never => false,
    }
}

/// `host[:port]`, lowercased, for a URI with or without a scheme.
fn host_and_port(uri: &str) -> Option<String> {
    let rest = match uri.find("://") {
        Some(index) => &uri[index + 3..],
        None => uri,
    };
    let authority = rest
        .split(|ch: char| matches!(ch, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let authority = match authority.rfind('@') {
        Some(index) => &authority[index + 1..],
        None => authority,
    };
    if authority.is_empty() {
        return None;
    }
    Some(authority.to_lowercase())
}

fn host(uri: &str) -> Option<String> {
    let authority = host_and_port(uri)?;
    if let Some(bracketed) = authority.strip_prefix('[') {
        return bracketed.split(']').next().map(str::to_string);
    }
    let host = authority.split(':').next().unwrap_or_default();
    (!host.is_empty()).then(|| host.to_string())
}

/// Registrable domain of the host per the public suffix list, so
/// `bank.co.uk` and `evil.co.uk` stay apart. IP addresses, `localhost` and
/// hosts that are themselves a suffix compare as a whole.
fn base_domain(uri: &str) -> Option<String> {
    let host = host(uri)?;
    if host.parse::<IpAddr>().is_ok() {
        return Some(host);
    }

    let host = host.trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    let registrable = psl::domain_str(host).unwrap_or(host);
    Some(registrable.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_ignores_subdomains_scheme_and_path() {
        let stored = "https://accounts.example.com/login?next=/";
        assert!(uri_matches(stored, "example.com", UriMatchStrategy::Domain));
        assert!(uri_matches(stored, "http://www.EXAMPLE.com", UriMatchStrategy::Domain));
        assert!(!uri_matches(stored, "example.org", UriMatchStrategy::Domain));
    }

    #[test]
    fn domain_respects_multi_label_suffixes() {
        let domain = UriMatchStrategy::Domain;
        assert!(!uri_matches("https://bank.co.uk/login", "evil.co.uk", domain));
        assert!(uri_matches("https://bank.co.uk/login", "www.bank.co.uk", domain));
        assert!(!uri_matches("https://alice.github.io", "mallory.github.io", domain));
        assert!(uri_matches("https://alice.github.io/blog", "alice.github.io", domain));
        assert!(!uri_matches("https://shop.example.com.au", "other.com.au", domain));
    }

    #[test]
    fn domain_compares_ip_addresses_whole() {
        assert!(uri_matches("http://192.168.1.1/admin", "192.168.1.1", UriMatchStrategy::Domain));
        assert!(!uri_matches("http://192.168.1.1", "10.168.1.1", UriMatchStrategy::Domain));
        assert!(uri_matches("http://localhost:8080", "localhost", UriMatchStrategy::Domain));
    }

    #[test]
    fn host_includes_the_port() {
        let stored = "https://user@vault.example.com:8443/path";
        assert!(uri_matches(stored, "vault.example.com:8443", UriMatchStrategy::Host));
        assert!(!uri_matches(stored, "vault.example.com", UriMatchStrategy::Host));
        assert!(!uri_matches(stored, "example.com:8443", UriMatchStrategy::Host));
    }

    #[test]
    fn starts_with_and_exact() {
        let stored = "https://example.com/app";
        assert!(uri_matches(stored, "https://example.com/app/settings", UriMatchStrategy::StartsWith));
        assert!(!uri_matches(stored, "https://example.com/", UriMatchStrategy::StartsWith));
        assert!(uri_matches(stored, "HTTPS://example.com/app", UriMatchStrategy::Exact));
        assert!(!uri_matches(stored, "https://example.com/app/", UriMatchStrategy::Exact));
    }

    #[test]
    fn regex_tests_the_website() {
        let stored = r"^https://(www\.)?example\.com/.*$";
        assert!(uri_matches(stored, "https://www.example.com/x", UriMatchStrategy::Regex));
        assert!(!uri_matches(stored, "https://example.org/x", UriMatchStrategy::Regex));
        assert!(!uri_matches("([", "anything", UriMatchStrategy::Regex));
    }

    #[test]
    fn never_and_blank_values_do_not_match() {
        assert!(!uri_matches("example.com", "example.com", UriMatchStrategy::Never));
        assert!(!uri_matches("", "example.com", UriMatchStrategy::Exact));
        assert!(!uri_matches("example.com", "  ", UriMatchStrategy::Domain));
    }
}
