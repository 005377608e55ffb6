use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;

pub const DEFAULT_SHEET_API_BASE: &str = "https://sheetdb.io/api/v1/crhv4u171vi50";

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_search_debounce() -> Duration {
    Duration::from_millis(300)
}

/// How a row is addressed when patching it upstream.
///
/// The key column (`Supplier / Brand`) contains a `/`, so it can never be
/// spliced into a URL path verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAddressing {
    /// `PATCH {base}?column=..&value=..`
    Query,
    /// `PATCH {base}/{column}/{value}` with each segment percent-encoded.
    Path,
}

impl FromStr for UpdateAddressing {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(UpdateAddressing::Query),
            "path" => Ok(UpdateAddressing::Path),
            other => Err(anyhow!("unknown update addressing '{}', expected 'query' or 'path'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub sheet_api_base: String,
    pub sheet_names: Vec<String>,
    pub update_addressing: UpdateAddressing,
    pub proxy_url: String,
    pub search_debounce: Duration,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("Failed to parse BIND_ADDR '{}': {}", raw, e))?,
            None => default_bind_addr(),
        };

        let sheet_api_base = var("SHEET_API_BASE")
            .unwrap_or_else(|| DEFAULT_SHEET_API_BASE.to_string());
        reqwest::Url::parse(&sheet_api_base)
            .map_err(|e| anyhow!("Failed to parse SHEET_API_BASE '{}': {}", sheet_api_base, e))?;

        let sheet_names: Vec<String> = var("SHEET_NAMES")
            .map(|raw| {
                raw.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["Sheet1".to_string()]);
        if sheet_names.is_empty() {
            return Err(anyhow!("SHEET_NAMES must name at least one sheet"));
        }

        let update_addressing = match var("UPDATE_ADDRESSING") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("Failed to parse UPDATE_ADDRESSING: {}", e))?,
            None => UpdateAddressing::Query,
        };

        let proxy_url = var("PROXY_URL")
            .unwrap_or_else(|| format!("http://{}/api/vendors", bind_addr));

        let search_debounce = match var("SEARCH_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|e| anyhow!("Failed to parse SEARCH_DEBOUNCE_MS '{}': {}", raw, e))?,
            ),
            None => default_search_debounce(),
        };

        Ok(Config {
            bind_addr,
            sheet_api_base,
            sheet_names,
            update_addressing,
            proxy_url,
            search_debounce,
        })
    }
}
