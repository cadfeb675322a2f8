#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR company facts client.
//!
//! This crate provides access to SEC EDGAR XBRL data:
//!
//! - CIK (Central Index Key) lookup from ticker symbols
//! - Company facts from the EDGAR XBRL API, parsed into a [`FactSet`]
//! - Request spacing per the SEC's published limit (10 requests/second)
//!
//! The client performs no retries. Throttling surfaces as
//! [`XbrlError::RateLimited`], timeouts and 5xx responses as
//! [`XbrlError::TransientNetwork`], so callers can choose their own backoff.
//!
//! # Example
//!
//! ```no_run
//! use xbrl_core::{FactSource, Ticker};
//! use xbrl_edgar::EdgarClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let cik = client.resolve_cik(&Ticker::new("SHOP")).await?;
//!     let facts = client.fetch_facts(&cik).await?;
//!     println!("{} facts for CIK {}", facts.fact_count(), cik);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace};
use xbrl_core::{Cik, Fact, FactSet, FactSource, Result, Ticker, XbrlError};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the SEC user agent.
pub const USER_AGENT_ENV: &str = "SEC_USER_AGENT";

/// Name reported through [`FactSource::name`].
pub const PROVIDER_NAME: &str = "SEC EDGAR";

/// Date format used throughout the EDGAR JSON payloads.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Configuration for [`EdgarClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgarConfig {
    /// Identifying user agent, "AppName/Version (contact@email.com)".
    pub user_agent: String,
    /// Base URL of the XBRL API.
    pub base_url: String,
    /// URL of the ticker directory.
    pub tickers_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum spacing between outbound requests.
    pub min_request_interval: Duration,
}

impl EdgarConfig {
    /// Creates a configuration with SEC defaults and the given user agent.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            base_url: EDGAR_BASE_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            min_request_interval: DEFAULT_RATE_LIMIT,
        }
    }

    /// Reads the user agent from `SEC_USER_AGENT`.
    ///
    /// # Errors
    /// Returns [`XbrlError::InvalidParameter`] if the variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(USER_AGENT_ENV).ok())
    }

    fn from_env_value(value: Option<String>) -> Result<Self> {
        match value {
            Some(ua) if !ua.trim().is_empty() => Ok(Self::new(ua.trim())),
            _ => Err(XbrlError::InvalidParameter(format!(
                "{USER_AGENT_ENV} must be set to an identifying user agent"
            ))),
        }
    }

    /// Overrides the XBRL API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the ticker directory URL.
    #[must_use]
    pub fn with_tickers_url(mut self, tickers_url: impl Into<String>) -> Self {
        self.tickers_url = tickers_url.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum spacing between requests.
    #[must_use]
    pub const fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    fn facts_url(&self, cik: &Cik) -> String {
        format!("{}/api/xbrl/companyfacts/CIK{}.json", self.base_url, cik)
    }
}

/// SEC EDGAR company facts client.
///
/// Fetches the ticker directory and XBRL company facts. Requests are spaced
/// by the configured minimum interval (default 100ms).
#[derive(Debug, Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    config: EdgarConfig,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EdgarClient {
    /// Create a new client with the specified user agent and SEC defaults.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns [`XbrlError::InvalidParameter`] for an empty user agent, or
    /// [`XbrlError::Network`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::from_config(EdgarConfig::new(user_agent))
    }

    /// Create a new client from a full configuration.
    ///
    /// # Errors
    /// Returns [`XbrlError::InvalidParameter`] for an empty user agent, or
    /// [`XbrlError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: EdgarConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(XbrlError::InvalidParameter("Empty user agent".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| XbrlError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a new client with a pre-configured reqwest client.
    ///
    /// The reqwest client is expected to carry the user agent header already.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: EdgarConfig) -> Self {
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(config.min_request_interval)));
        Self {
            client,
            config,
            rate_limiter,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &EdgarConfig {
        &self.config
    }

    /// Issue a rate-limited GET and map the response status onto [`XbrlError`].
    async fn get(&self, url: &str, what: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        debug!("Fetching {} from {}", what, url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        Err(map_status(status, retry_after, what))
    }
}

#[async_trait]
impl FactSource for EdgarClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn resolve_cik(&self, ticker: &Ticker) -> Result<Cik> {
        if ticker.as_str().is_empty() {
            return Err(XbrlError::InvalidParameter("Empty ticker".to_string()));
        }

        let response = self.get(&self.config.tickers_url, "company tickers").await?;
        let body = response.text().await.map_err(|e| map_body_error(&e))?;
        let data: HashMap<String, CompanyTickerInfo> = serde_json::from_str(&body)
            .map_err(|e| XbrlError::Parse(format!("Failed to parse company tickers: {e}")))?;

        let cik = find_ticker(&data, ticker)?;
        debug!("Found CIK {} for ticker {}", cik, ticker);
        Ok(cik)
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn fetch_facts(&self, cik: &Cik) -> Result<FactSet> {
        let url = self.config.facts_url(cik);
        let what = format!("company facts for CIK {cik}");

        let response = self.get(&url, &what).await?;
        let body = response.text().await.map_err(|e| map_body_error(&e))?;

        let facts = parse_company_facts(&body)?;
        debug!(count = facts.fact_count(), "Parsed company facts");
        Ok(facts)
    }
}

/// Parse a company facts JSON document into a [`FactSet`].
///
/// Observations with an unparseable `end` date are dropped; unparseable
/// `start` or `filed` dates become `None`.
///
/// # Errors
/// Returns [`XbrlError::Parse`] if the document does not have the company
/// facts shape.
pub fn parse_company_facts(json: &str) -> Result<FactSet> {
    let response: CompanyFactsResponse = serde_json::from_str(json)
        .map_err(|e| XbrlError::Parse(format!("Failed to parse company facts: {e}")))?;
    Ok(response.into_fact_set())
}

/// Exact, case-insensitive ticker lookup in the SEC ticker directory.
fn find_ticker(data: &HashMap<String, CompanyTickerInfo>, ticker: &Ticker) -> Result<Cik> {
    data.values()
        .find(|company| company.ticker.eq_ignore_ascii_case(ticker.as_str()))
        .map(|company| Cik::from_number(company.cik_str))
        .ok_or_else(|| XbrlError::NotFound(ticker.to_string()))
}

/// Map a non-success HTTP status onto the error taxonomy.
fn map_status(status: StatusCode, retry_after: Option<Duration>, what: &str) -> XbrlError {
    match status {
        StatusCode::NOT_FOUND => XbrlError::NotFound(what.to_string()),
        StatusCode::TOO_MANY_REQUESTS => XbrlError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after,
        },
        StatusCode::REQUEST_TIMEOUT => {
            XbrlError::TransientNetwork(format!("Failed to fetch {what}: HTTP {status}"))
        }
        s if s.is_server_error() => {
            XbrlError::TransientNetwork(format!("Failed to fetch {what}: HTTP {status}"))
        }
        _ => XbrlError::Network(format!("Failed to fetch {what}: HTTP {status}")),
    }
}

/// Timeouts, connection failures and interrupted transfers are transient;
/// everything else is not.
fn map_transport_error(e: &reqwest::Error) -> XbrlError {
    if e.is_timeout() || e.is_connect() || e.is_body() || (e.is_request() && !e.is_builder()) {
        XbrlError::TransientNetwork(e.to_string())
    } else {
        XbrlError::Network(e.to_string())
    }
}

/// Reading the body only fails when the transfer does (reset, truncation,
/// timeout). Payload decoding happens afterwards in serde_json.
fn map_body_error(e: &reqwest::Error) -> XbrlError {
    if e.is_builder() {
        return XbrlError::Network(e.to_string());
    }
    XbrlError::TransientNetwork(format!("Failed to read response body: {e}"))
}

/// Only the delay-seconds form of `Retry-After` is honoured.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Company ticker information from SEC JSON.
#[derive(Debug, Deserialize)]
struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
}

/// Response from the SEC EDGAR Company Facts API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFactsResponse {
    #[serde(default)]
    cik: Option<u64>,
    #[serde(default)]
    entity_name: Option<String>,
    /// Facts organized by taxonomy and tag
    #[serde(default)]
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

impl CompanyFactsResponse {
    fn into_fact_set(self) -> FactSet {
        let mut set = FactSet::new();
        set.cik = self.cik.map(Cik::from_number);
        set.entity_name = self.entity_name;

        for (taxonomy, tags) in self.facts {
            for (tag, tag_facts) in tags {
                let Some(units) = tag_facts.units else {
                    continue;
                };
                for (unit, values) in units {
                    for value in values {
                        match value.into_fact(&tag, &unit) {
                            Some(fact) => set.insert(taxonomy.clone(), fact),
                            None => trace!(%taxonomy, %tag, %unit, "Dropping fact with bad end date"),
                        }
                    }
                }
            }
        }

        set
    }
}

/// Facts for a specific XBRL tag.
#[derive(Debug, Deserialize)]
struct TagFacts {
    /// Units (USD, shares, etc.) containing the actual fact values
    #[serde(default)]
    units: Option<HashMap<String, Vec<FactValue>>>,
}

/// A single fact value with metadata.
#[derive(Debug, Clone, Deserialize)]
struct FactValue {
    end: String,
    #[serde(default)]
    start: Option<String>,
    val: f64,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
}

impl FactValue {
    fn into_fact(self, tag: &str, unit: &str) -> Option<Fact> {
        let end = parse_date(&self.end)?;
        Some(Fact {
            end,
            start: self.start.as_deref().and_then(parse_date),
            value: self.val,
            form: self.form,
            filed: self.filed.as_deref().and_then(parse_date),
            fiscal_year: self.fy,
            fiscal_period: self.fp,
            tag: tag.to_string(),
            unit: unit.to_string(),
            accession: self.accn,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
