//! popdash
//!
//! A lightweight Rust library for turning World Bank population data
//! (`SP.POP.TOTL`) into dashboard figures. Pairs with the `popdash` CLI.
//!
//! ### Features
//! - Fetch country metadata and population observations, with cancellation
//! - Normalize raw API records into flat rows
//! - Filter by country and inclusive year range
//! - KPIs: latest year, total population, country count, year-over-year growth
//! - Annual series, top-N country ranking, sortable/paginated table
//!
//! ### Example
//! ```no_run
//! use popdash::{CancelToken, Client, FilterCriteria, YearRange};
//!
//! let client = Client::default();
//! let rows = client.fetch_observations(YearRange::new(1960, 2024), &CancelToken::new())?;
//! let criteria = FilterCriteria::from_inputs("", "Germany", "2010", "2020")?;
//! let filtered = popdash::filter::apply_filter(&rows, &criteria);
//! let kpis = popdash::stats::aggregate(&filtered);
//! println!("{:#?}", kpis.latest_year);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cancel;
pub mod countries;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod normalize;
pub mod prefs;
pub mod stats;
pub mod storage;
pub mod table;

pub use api::{Client, ClientConfig, DataSource};
pub use cancel::CancelToken;
pub use dashboard::{Dashboard, DashboardConfig, LoadEvent};
pub use error::{FetchError, FilterError};
pub use filter::FilterCriteria;
pub use models::{Country, Observation, YearRange};
pub use stats::{EMPTY_SNAPSHOT, KpiSnapshot};
