//! HTTP client utilities
//!
//! Provides a reqwest::Client configured with timeout, user agent and system proxy support

use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

use crate::error::AppError;

/// Build a reqwest Client honoring system proxy env vars
///
/// Recognized env vars:
/// - HTTP_PROXY / http_proxy
/// - HTTPS_PROXY / https_proxy
/// - ALL_PROXY / all_proxy
/// - NO_PROXY / no_proxy
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, AppError> {
    let mut builder = Client::builder().timeout(timeout).user_agent(user_agent);

    let https_proxy = getenv_first(&["HTTPS_PROXY", "https_proxy"])
        .or_else(|| getenv_first(&["ALL_PROXY", "all_proxy"]));
    let http_proxy = getenv_first(&["HTTP_PROXY", "http_proxy"])
        .or_else(|| getenv_first(&["ALL_PROXY", "all_proxy"]));
    let no_proxy_rules = parse_no_proxy(&getenv_first(&["NO_PROXY", "no_proxy"]).unwrap_or_default());

    if https_proxy.is_some() || http_proxy.is_some() {
        let proxy = Proxy::custom(move |url: &Url| {
            select_proxy(url, https_proxy.as_deref(), http_proxy.as_deref(), &no_proxy_rules)
        });
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

fn getenv_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq)]
enum NoProxyRule {
    Wildcard,
    Domain(String), // matches suffix
    Exact(String),
}

fn parse_no_proxy(val: &str) -> Vec<NoProxyRule> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            if token == "*" {
                return NoProxyRule::Wildcard;
            }
            if let Some(domain) = token.strip_prefix('.') {
                return NoProxyRule::Domain(domain.to_ascii_lowercase());
            }
            let t = token.to_ascii_lowercase();
            if t == "localhost" || t.parse::<std::net::IpAddr>().is_ok() {
                NoProxyRule::Exact(t)
            } else {
                NoProxyRule::Domain(t)
            }
        })
        .collect()
}

fn is_loopback(host: &str) -> bool {
    host == "localhost"
        || host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
}

/// Loopback hosts never go through a proxy
fn should_bypass_proxy(host: &str, rules: &[NoProxyRule]) -> bool {
    if host.is_empty() {
        return false;
    }
    let host_lc = host.to_ascii_lowercase();
    if is_loopback(&host_lc) {
        return true;
    }
    rules.iter().any(|r| match r {
        NoProxyRule::Wildcard => true,
        NoProxyRule::Exact(ex) => host_lc == *ex,
        NoProxyRule::Domain(suf) => host_lc == *suf || host_lc.ends_with(&format!(".{}", suf)),
    })
}

fn select_proxy(
    url: &Url,
    https_proxy: Option<&str>,
    http_proxy: Option<&str>,
    rules: &[NoProxyRule],
) -> Option<String> {
    if should_bypass_proxy(url.host_str().unwrap_or(""), rules) {
        return None;
    }
    match url.scheme() {
        "https" => https_proxy.or(http_proxy).map(str::to_string),
        "http" => http_proxy.or(https_proxy).map(str::to_string),
        _ => None,
    }
}
