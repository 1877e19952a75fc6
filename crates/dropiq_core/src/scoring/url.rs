//! URL heuristics: scheme, TLD, look-alike domains and query parameters.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CoreError, CoreResult};

/// Legitimate crypto domains that phishing sites imitate.
pub const DEFAULT_POPULAR_DOMAINS: &[&str] = &[
    "uniswap.org",
    "opensea.io",
    "metamask.io",
    "coinbase.com",
    "binance.com",
    "pancakeswap.finance",
    "curve.fi",
    "aave.com",
    "lido.fi",
    "arbitrum.io",
    "optimism.io",
    "layerzero.network",
    "zksync.io",
    "etherscan.io",
    "sushi.com",
    "1inch.io",
    "compound.finance",
    "blur.io",
    "polygon.technology",
    "starknet.io",
];

/// TLDs disproportionately used for throwaway phishing sites.
pub const SUSPICIOUS_TLDS: &[&str] = &[
    "xyz", "top", "tk", "ml", "ga", "cf", "gq", "click", "zip", "mov", "country", "kim", "work",
    "loan", "buzz", "rest", "fit",
];

/// Query parameter names no legitimate dapp asks for.
const SUSPICIOUS_PARAMS: &[&str] = &[
    "private_key",
    "privatekey",
    "pk",
    "seed",
    "seed_phrase",
    "seedphrase",
    "mnemonic",
    "password",
    "passphrase",
    "secret",
    "keystore",
    "approve",
    "approval",
    "permit",
    "setapprovalforall",
];

/// Edit distance below which a host counts as a look-alike.
const TYPOSQUAT_MAX_DISTANCE: usize = 2;

/// Findings about a single URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAssessment {
    /// Lowercase host without a leading `www.`
    pub host: String,
    pub uses_https: bool,
    pub suspicious_tld: Option<String>,
    /// Popular domain this host imitates, with the edit distance
    pub typosquat_of: Option<(String, usize)>,
    pub suspicious_params: Vec<String>,
}

/// Levenshtein edit distance, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn parse_lenient(input: &str) -> CoreResult<Url> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{input}"))
            .map_err(|e| CoreError::validation("url", e.to_string())),
        Err(e) => Err(CoreError::validation("url", e.to_string())),
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Reduce a URL or bare domain to its lowercase host (without `www.`).
/// Anything that is not URL-like is returned lowercased and trimmed.
pub fn extract_host(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return trimmed.to_lowercase();
    }
    parse_lenient(trimmed)
        .ok()
        .and_then(|url| url.host_str().map(|h| strip_www(&h.to_lowercase()).to_string()))
        .unwrap_or_else(|| trimmed.to_lowercase())
}

/// Closest popular domain within the look-alike distance, if any.
fn typosquat_target(host: &str, popular_domains: &[String]) -> Option<(String, usize)> {
    // Subdomains of a legitimate domain are that domain.
    if popular_domains
        .iter()
        .any(|d| host == d.as_str() || host.ends_with(&format!(".{d}")))
    {
        return None;
    }
    popular_domains
        .iter()
        .map(|d| (d.clone(), levenshtein(host, d)))
        .filter(|(_, distance)| *distance > 0 && *distance <= TYPOSQUAT_MAX_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
}

/// Run every URL check.
pub fn assess_url(input: &str, popular_domains: &[String]) -> CoreResult<UrlAssessment> {
    let url = parse_lenient(input)?;
    let host = url
        .host_str()
        .map(|h| strip_www(&h.to_lowercase()).to_string())
        .ok_or_else(|| CoreError::validation("url", "URL has no host"))?;

    let suspicious_tld = host
        .rsplit('.')
        .next()
        .filter(|tld| SUSPICIOUS_TLDS.contains(tld))
        .map(str::to_string);

    let mut suspicious_params: Vec<String> = url
        .query_pairs()
        .map(|(key, _)| key.to_lowercase().replace('-', "_"))
        .filter(|key| SUSPICIOUS_PARAMS.contains(&key.as_str()))
        .collect();
    suspicious_params.sort();
    suspicious_params.dedup();

    Ok(UrlAssessment {
        uses_https: url.scheme() == "https",
        suspicious_tld,
        typosquat_of: typosquat_target(&host, popular_domains),
        suspicious_params,
        host,
    })
}
