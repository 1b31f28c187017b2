//! Asset URL rewriting for the deployment environment.

use serde::{Deserialize, Serialize};

/// Maps an asset URL to the URL that should actually be fetched.
pub trait UrlRewriter {
    fn rewrite(&self, url: &str) -> String;
}

/// Leaves every URL untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRewriter;

impl UrlRewriter for PassthroughRewriter {
    fn rewrite(&self, url: &str) -> String {
        url.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Remote hosts are reached through same-origin dev-server prefixes.
    Development,
    /// Remote hosts are reached through the CORS proxy, when one is configured.
    #[default]
    Production,
}

/// Hosts that do not send CORS headers, with their development prefix.
const PROXIED_HOSTS: [(&str, &str); 3] = [
    ("cards.scryfall.io", "/scryfall-images"),
    ("svgs.scryfall.io", "/scryfall-symbols"),
    ("drive.google.com", "/gdrive-images"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRewriter {
    pub mode: ProxyMode,
    /// Endpoint taking the target as a `url` query parameter.
    #[serde(default)]
    pub cors_proxy: Option<String>,
    /// Prefix for local assets; always ends with `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    String::from("/")
}

impl Default for ProxyRewriter {
    fn default() -> Self {
        Self {
            mode: ProxyMode::default(),
            cors_proxy: None,
            base_url: default_base_url(),
        }
    }
}

impl ProxyRewriter {
    #[must_use]
    pub fn new(mode: ProxyMode, cors_proxy: Option<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            mode,
            cors_proxy: cors_proxy.filter(|proxy| !proxy.is_empty()),
            base_url,
        }
    }
}

impl UrlRewriter for ProxyRewriter {
    fn rewrite(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        if let Some((host, prefix)) = PROXIED_HOSTS.iter().find(|(host, _)| url.contains(host)) {
            return match self.mode {
                ProxyMode::Development => {
                    let origin = format!("https://{host}");
                    format!("{prefix}{}", url.replacen(&origin, "", 1))
                }
                ProxyMode::Production => match &self.cors_proxy {
                    Some(proxy) => format!("{proxy}?url={}", encode_uri_component(url)),
                    None => url.to_string(),
                },
            };
        }

        if let Some(rest) = url.strip_prefix('/') {
            return format!("{}{rest}", self.base_url);
        }

        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
            return url.to_string();
        }

        format!("{}{url}", self.base_url)
    }
}

/// Percent-encode everything except the characters `encodeURIComponent` keeps.
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
