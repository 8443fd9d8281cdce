//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! Covers the two endpoints the dashboard needs: `country/{scope}/indicator/{code}`
//! for observations and `country` for metadata. Observations come back as
//! normalized [`Observation`] rows. Pagination is handled automatically.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
//! - A payload that is not the expected `[meta, records]` array is treated as
//!   "no data", not as an error.
//! - Every call takes a [`CancelToken`]; a cancelled call returns
//!   [`FetchError::Cancelled`] instead of data.
//!
//! Typical usage:
//! ```no_run
//! # use popdash::{CancelToken, Client, YearRange};
//! let client = Client::default();
//! let rows = client.fetch_observations(YearRange::new(2015, 2020), &CancelToken::new())?;
//! # Ok::<(), popdash::FetchError>(())
//! ```
use crate::cancel::CancelToken;
use crate::countries::parse_countries;
use crate::error::FetchError;
use crate::models::{Country, Meta, Observation, YearRange};
use crate::normalize::normalize_values;
use chrono::Datelike;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Total population indicator.
pub const POPULATION_INDICATOR: &str = "SP.POP.TOTL";

/// First year the World Bank publishes population data for.
pub const FIRST_DATA_YEAR: i32 = 1960;

/// Connection and query settings for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub indicator: String,
    /// Country scope of indicator queries (`all`, or `DEU;FRA`).
    pub scope: String,
    pub per_page: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Delays between attempts after a 5xx or transport error.
    pub backoff_ms: Vec<u64>,
    /// Safety cap to avoid pathological jobs.
    pub max_pages: u32,
    /// Honor `HTTP(S)_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            indicator: POPULATION_INDICATOR.into(),
            scope: "all".into(),
            per_page: 20000,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            backoff_ms: vec![100, 300, 700],
            max_pages: 1000,
            system_proxy: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub config: ClientConfig,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default()).expect("reqwest client build")
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Split an API payload into its meta block and records.
///
/// Anything other than `[meta, [records...]]` (an error object, a bare
/// object, a one-element array) yields no records.
pub fn split_payload(v: &Value) -> (Option<Meta>, &[Value]) {
    let Some(arr) = v.as_array() else {
        log::warn!("unexpected response shape: not a top-level array");
        return (None, &[]);
    };
    let Some(first) = arr.first() else {
        log::warn!("unexpected response: empty array");
        return (None, &[]);
    };
    if first.get("message").is_some() {
        log::warn!("world bank api error: {}", first);
        return (None, &[]);
    }
    let meta = serde_json::from_value::<Meta>(first.clone()).ok();
    let records = arr.get(1).and_then(Value::as_array).map(Vec::as_slice);
    (meta, records.unwrap_or(&[]))
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut builder = HttpClient::builder()
            .timeout(config.timeout) // total request timeout
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("popdash/", env!("CARGO_PKG_VERSION")));
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Server errors (5xx) and transport failures, including a body cut off
    /// mid-read, are retried following `config.backoff_ms`; other non-2xx
    /// statuses fail at once with [`FetchError::Network`].
    pub fn get_json(&self, url: &str, token: &CancelToken) -> Result<Value, FetchError> {
        let attempts = self.config.backoff_ms.len() + 1;
        let mut last_err: Option<FetchError> = None;
        for attempt in 0..attempts {
            if token.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            log::debug!("GET {} (attempt {}/{})", url, attempt + 1, attempts);
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => match r.text() {
                    Ok(body) => {
                        if token.is_cancelled() {
                            return Err(FetchError::Cancelled);
                        }
                        return Ok(serde_json::from_str(&body)?);
                    }
                    Err(e) => {
                        log::debug!("reading body of {} failed: {}", url, e);
                        last_err = Some(e.into());
                    }
                },
                Ok(r) if r.status().is_server_error() => {
                    last_err = Some(FetchError::Network {
                        status: r.status().as_u16(),
                    });
                }
                Ok(r) => {
                    return Err(FetchError::Network {
                        status: r.status().as_u16(),
                    });
                }
                Err(e) => last_err = Some(e.into()),
            }
            if let Some(ms) = self.config.backoff_ms.get(attempt) {
                std::thread::sleep(Duration::from_millis(*ms));
            }
        }
        Err(last_err.unwrap_or(FetchError::Cancelled))
    }

    pub fn observations_url(&self, range: YearRange) -> String {
        format!(
            "{}/country/{}/indicator/{}?format=json&per_page={}&date={}",
            self.config.base_url,
            enc_join(self.config.scope.split(';')),
            enc_join([self.config.indicator.as_str()]),
            self.config.per_page,
            range.to_query_param()
        )
    }

    pub fn countries_url(&self) -> String {
        format!("{}/country?format=json&per_page=400", self.config.base_url)
    }

    /// Fetch and normalize all observations for `range`, following pagination.
    pub fn fetch_observations(
        &self,
        range: YearRange,
        token: &CancelToken,
    ) -> Result<Vec<Observation>, FetchError> {
        let url = self.observations_url(range);
        let mut page = 1u32;
        let mut out: Vec<Observation> = Vec::new();
        loop {
            if page > self.config.max_pages {
                return Err(FetchError::PageLimit(self.config.max_pages));
            }
            let page_url = format!("{}&page={}", url, page);
            let v = self.get_json(&page_url, token)?;
            let (meta, records) = split_payload(&v);
            log::debug!("page {} returned {} records", page, records.len());
            out.extend(normalize_values(records));

            let total_pages = meta.map(|m| m.pages).unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    /// Fetch country and aggregate metadata, sorted by localized name.
    pub fn fetch_countries(&self, token: &CancelToken) -> Result<Vec<Country>, FetchError> {
        let v = self.get_json(&self.countries_url(), token)?;
        let (_, records) = split_payload(&v);
        Ok(parse_countries(records))
    }

    /// Fetch the window used by the top-countries panel:
    /// `[max(1960, target - lookback + 1), target]`, with `target` defaulting
    /// to the current year.
    pub fn fetch_top_window(
        &self,
        target: Option<i32>,
        lookback: u32,
        token: &CancelToken,
    ) -> Result<(YearRange, Vec<Observation>), FetchError> {
        let range = top_window(target.unwrap_or_else(|| chrono::Local::now().year()), lookback);
        let rows = self.fetch_observations(range, token)?;
        Ok((range, rows))
    }
}

/// Year window ending at `target` spanning `lookback` years (at least one).
pub fn top_window(target: i32, lookback: u32) -> YearRange {
    let span = lookback.max(1) as i32;
    YearRange::new(FIRST_DATA_YEAR.max(target - span + 1), target)
}

/// Anything that can produce observations for a year range.
///
/// The dashboard loads through this seam so loads can be driven without the network.
pub trait DataSource: Send + Sync + 'static {
    fn load(&self, range: YearRange, token: &CancelToken) -> Result<Vec<Observation>, FetchError>;
}

impl<S: DataSource> DataSource for std::sync::Arc<S> {
    fn load(&self, range: YearRange, token: &CancelToken) -> Result<Vec<Observation>, FetchError> {
        self.as_ref().load(range, token)
    }
}

impl DataSource for Client {
    fn load(&self, range: YearRange, token: &CancelToken) -> Result<Vec<Observation>, FetchError> {
        self.fetch_observations(range, token)
    }
}
