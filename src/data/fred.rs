//! FRED (Federal Reserve Economic Data) API client
//!
//! Fetches named economic time series and derives inflation figures, an
//! economic-indicators snapshot, inflation-adjusted amounts, and poverty
//! guideline context from them. Every request carries the API key.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::policy::current_policy;
use super::{iso_date, months_before, percent_change, Observation, SortOrder};
use crate::cache::{cache_key, CacheManager};

/// Base URL for the FRED API
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

const SERIES_PATH: &str = "/series";
const OBSERVATIONS_PATH: &str = "/series/observations";
const SEARCH_PATH: &str = "/series/search";

/// Time-to-live for FRED cache entries in hours
const CACHE_TTL_HOURS: i64 = 6;

/// FRED's marker for a period with no value
const MISSING_VALUE: &str = ".";

/// CPI-U index base period is 1982-84 = 100
const CPI_BASE_YEAR: u16 = 1982;

/// Trailing window needed to find the same month one year back
const INFLATION_WINDOW_MONTHS: u32 = 13;

/// Errors that can occur when fetching FRED data
#[derive(Debug, Error)]
pub enum FredError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("FRED API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A derived figure needs more observations than upstream returned
    #[error("Insufficient data: needed {needed} observations, found {found}")]
    InsufficientData { needed: usize, found: usize },

    /// A series returned no observations at all
    #[error("No observations available for series {0}")]
    NoData(String),
}

/// Series this crate knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesId {
    /// Consumer Price Index for All Urban Consumers
    Cpi,
    FederalFundsRate,
    UnemploymentRate,
    MedianHouseholdIncome,
    /// Student loans owned and securitized, billions of dollars
    TotalStudentLoans,
    Gdp,
    /// Annual CPI inflation rate
    InflationRate,
}

impl SeriesId {
    /// Returns a slice containing all known series
    pub fn all() -> &'static [SeriesId] {
        &[
            SeriesId::Cpi,
            SeriesId::FederalFundsRate,
            SeriesId::UnemploymentRate,
            SeriesId::MedianHouseholdIncome,
            SeriesId::TotalStudentLoans,
            SeriesId::Gdp,
            SeriesId::InflationRate,
        ]
    }

    /// The FRED series identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesId::Cpi => "CPIAUCSL",
            SeriesId::FederalFundsRate => "FEDFUNDS",
            SeriesId::UnemploymentRate => "UNRATE",
            SeriesId::MedianHouseholdIncome => "MEHOINUSA672N",
            SeriesId::TotalStudentLoans => "SLOAS",
            SeriesId::Gdp => "GDP",
            SeriesId::InflationRate => "FPCPITOTLZGUSA",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SeriesId::Cpi => "Consumer Price Index",
            SeriesId::FederalFundsRate => "Federal Funds Rate",
            SeriesId::UnemploymentRate => "Unemployment Rate",
            SeriesId::MedianHouseholdIncome => "Median Household Income",
            SeriesId::TotalStudentLoans => "Total Student Loans",
            SeriesId::Gdp => "Gross Domestic Product",
            SeriesId::InflationRate => "Inflation Rate",
        }
    }

    /// Looks up a known series by its FRED identifier (case-insensitive)
    pub fn from_id(id: &str) -> Option<SeriesId> {
        SeriesId::all()
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(id.trim()))
    }
}

/// Metadata describing one FRED series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMeta {
    pub id: String,
    pub title: String,
    pub observation_start: NaiveDate,
    pub observation_end: NaiveDate,
    pub frequency: String,
    pub units: String,
    pub notes: Option<String>,
}

/// Filters for an observations request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub sort_order: Option<SortOrder>,
}

/// CPI-derived inflation figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationSnapshot {
    #[serde(rename = "currentCPI")]
    pub current_cpi: f64,
    /// Percent change against the same month one year earlier
    pub year_over_year_change: f64,
    /// Percent change against the preceding observation
    pub month_over_month_change: f64,
    pub base_year: u16,
    pub last_updated: NaiveDate,
}

/// Latest readings of the headline indicators; a series that failed to load
/// is `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicators {
    pub cpi: Option<Observation>,
    pub federal_funds_rate: Option<Observation>,
    pub unemployment_rate: Option<Observation>,
    pub total_student_loans: Option<Observation>,
    pub last_updated: DateTime<Utc>,
}

/// Outstanding student loan balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStudentLoans {
    /// Billions of dollars
    pub amount: f64,
    pub date: NaiveDate,
    pub formatted_amount: String,
}

/// Poverty guideline figures next to a live inflation adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PovertyContext {
    /// Calendar year the guideline was published for
    pub guideline_year: i32,
    pub federal_poverty_level: f64,
    pub per_additional_person: f64,
    /// `1 + year-over-year CPI change / 100`
    pub inflation_adjustment_factor: f64,
    pub last_updated: NaiveDate,
}

/// Envelope for `/series` and `/series/search`
#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    seriess: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    id: String,
    #[serde(default)]
    title: String,
    observation_start: NaiveDate,
    observation_end: NaiveDate,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    units: String,
    #[serde(default)]
    notes: Option<String>,
}

impl From<RawSeries> for SeriesMeta {
    fn from(raw: RawSeries) -> Self {
        SeriesMeta {
            id: raw.id,
            title: raw.title,
            observation_start: raw.observation_start,
            observation_end: raw.observation_end,
            frequency: raw.frequency,
            units: raw.units,
            notes: raw.notes,
        }
    }
}

/// Envelope for `/series/observations`
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: NaiveDate,
    value: String,
}

impl RawObservation {
    /// The numeric value, or `None` for the missing-value marker
    fn value(&self) -> Option<f64> {
        if self.value == MISSING_VALUE {
            return None;
        }
        self.value.trim().parse().ok()
    }
}

/// Drops observations without a value
fn present_observations(raw: Vec<RawObservation>) -> Vec<Observation> {
    raw.into_iter()
        .filter_map(|o| {
            o.value().map(|value| Observation {
                date: o.date,
                value,
            })
        })
        .collect()
}

/// Client for the FRED API
#[derive(Debug, Clone)]
pub struct FredClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cache for normalized responses
    cache: CacheManager,
    api_key: String,
    /// Base URL for the API (overridable only in tests)
    base_url: String,
}

impl FredClient {
    /// Creates a new FredClient authenticating with `api_key`
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Creates a new FredClient with a custom HTTP client
    pub fn with_client(http_client: Client, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            cache: CacheManager::new(),
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
        }
    }

    /// Creates a new FredClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new("test-key")
        }
    }

    /// Fetches metadata for one series, `None` if FRED has no such series
    pub async fn get_series_info(&self, series_id: &str) -> Result<Option<SeriesMeta>, FredError> {
        let key = format!("series:{}", series_id);
        if let Some(cached) = self.cache.read::<SeriesMeta>(&key) {
            log::debug!("fred: cache hit {}", key);
            return Ok(Some(cached));
        }

        let query = [("series_id", series_id.to_string())];
        let response: SeriesResponse = self.fetch(SERIES_PATH, &query).await?;
        let meta = response.seriess.into_iter().next().map(SeriesMeta::from);

        if let Some(ref meta) = meta {
            self.cache.write(&key, meta, chrono::Duration::hours(CACHE_TTL_HOURS));
        }
        Ok(meta)
    }

    /// Fetches observations of a series, without any missing values
    pub async fn get_series_observations(
        &self,
        series_id: &str,
        params: &ObservationQuery,
    ) -> Result<Vec<Observation>, FredError> {
        let key = cache_key(&format!("observations:{}", series_id), params);
        if let Some(cached) = self.cache.read::<Vec<Observation>>(&key) {
            log::debug!("fred: cache hit {}", key);
            return Ok(cached);
        }

        let mut query = vec![("series_id", series_id.to_string())];
        if let Some(start) = params.start_date {
            query.push(("observation_start", iso_date(start)));
        }
        if let Some(end) = params.end_date {
            query.push(("observation_end", iso_date(end)));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(order) = params.sort_order {
            query.push(("sort_order", order.as_str().to_string()));
        }

        let response: ObservationsResponse = self.fetch(OBSERVATIONS_PATH, &query).await?;
        let observations = present_observations(response.observations);

        self.cache.write(&key, &observations, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(observations)
    }

    /// Most recent observation of a series
    pub async fn get_latest_observation(&self, series_id: &str) -> Result<Option<Observation>, FredError> {
        let params = ObservationQuery {
            limit: Some(1),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let observations = self.get_series_observations(series_id, &params).await?;
        Ok(observations.into_iter().next())
    }

    /// Current CPI with month-over-month and year-over-year inflation
    pub async fn get_inflation_data(&self) -> Result<InflationSnapshot, FredError> {
        let key = "inflation";
        if let Some(cached) = self.cache.read::<InflationSnapshot>(key) {
            log::debug!("fred: cache hit {}", key);
            return Ok(cached);
        }

        let today = Utc::now().date_naive();
        let params = ObservationQuery {
            start_date: Some(months_before(today, INFLATION_WINDOW_MONTHS)),
            end_date: Some(today),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let observations = self.get_series_observations(SeriesId::Cpi.as_str(), &params).await?;
        let snapshot = inflation_snapshot(&observations)?;
        log::info!(
            "fred: CPI {} ({:.2}% YoY, {:.2}% MoM)",
            snapshot.current_cpi,
            snapshot.year_over_year_change,
            snapshot.month_over_month_change
        );

        self.cache.write(key, &snapshot, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(snapshot)
    }

    /// Latest CPI, federal funds rate, unemployment rate, and student loan
    /// total, fetched concurrently
    ///
    /// A series that fails to load is reported as `None`; this call itself
    /// never fails.
    pub async fn get_economic_indicators(&self) -> EconomicIndicators {
        let (cpi, federal_funds_rate, unemployment_rate, total_student_loans) = futures::join!(
            self.latest_or_none(SeriesId::Cpi),
            self.latest_or_none(SeriesId::FederalFundsRate),
            self.latest_or_none(SeriesId::UnemploymentRate),
            self.latest_or_none(SeriesId::TotalStudentLoans),
        );

        EconomicIndicators {
            cpi,
            federal_funds_rate,
            unemployment_rate,
            total_student_loans,
            last_updated: Utc::now(),
        }
    }

    async fn latest_or_none(&self, series: SeriesId) -> Option<Observation> {
        match self.get_latest_observation(series.as_str()).await {
            Ok(observation) => observation,
            Err(e) => {
                log::warn!("fred: {} unavailable: {}", series.label(), e);
                None
            }
        }
    }

    /// Latest outstanding student loan balance
    pub async fn get_total_student_loans(&self) -> Result<TotalStudentLoans, FredError> {
        let series = SeriesId::TotalStudentLoans.as_str();
        let latest = self
            .get_latest_observation(series)
            .await?
            .ok_or_else(|| FredError::NoData(series.to_string()))?;

        Ok(TotalStudentLoans {
            amount: latest.value,
            date: latest.date,
            formatted_amount: format_billions(latest.value),
        })
    }

    /// CPI observations over the trailing `years` years, oldest first
    pub async fn get_cpi_history(&self, years: u32) -> Result<Vec<Observation>, FredError> {
        let today = Utc::now().date_naive();
        let params = ObservationQuery {
            start_date: Some(months_before(today, years.saturating_mul(12))),
            end_date: Some(today),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        self.get_series_observations(SeriesId::Cpi.as_str(), &params).await
    }

    /// Restates `amount` in `to_year` dollars using CPI from January of each year
    ///
    /// When fewer than two CPI observations fall in range the amount is
    /// returned unchanged; the same holds when both years are equal.
    pub async fn adjust_for_inflation(
        &self,
        amount: f64,
        from_year: i32,
        to_year: i32,
    ) -> Result<f64, FredError> {
        let (start_year, end_year) = if from_year <= to_year {
            (from_year, to_year)
        } else {
            (to_year, from_year)
        };
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(start_year, 1, 1),
            NaiveDate::from_ymd_opt(end_year, 1, 1),
        ) else {
            return Ok(amount);
        };

        let params = ObservationQuery {
            start_date: Some(start),
            end_date: Some(end),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let observations = self.get_series_observations(SeriesId::Cpi.as_str(), &params).await?;
        Ok(scale_by_cpi(amount, &observations, from_year > to_year))
    }

    /// Free-text series search; never cached
    pub async fn search_series(&self, query: &str, limit: u32) -> Result<Vec<SeriesMeta>, FredError> {
        let params = [("search_text", query.to_string()), ("limit", limit.to_string())];
        let response: SeriesResponse = self.fetch(SEARCH_PATH, &params).await?;
        Ok(response.seriess.into_iter().map(SeriesMeta::from).collect())
    }

    /// Current poverty guideline with a live CPI adjustment factor
    pub async fn get_poverty_context(&self) -> Result<PovertyContext, FredError> {
        let inflation = self.get_inflation_data().await?;
        let guideline = current_policy().poverty_guideline;

        Ok(PovertyContext {
            guideline_year: guideline.year,
            federal_poverty_level: guideline.first_person,
            per_additional_person: guideline.per_additional_person,
            inflation_adjustment_factor: 1.0 + inflation.year_over_year_change / 100.0,
            last_updated: inflation.last_updated,
        })
    }

    /// Issues a GET against `path` and decodes a successful JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FredError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("fred: GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FredError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Derives inflation figures from CPI observations sorted newest first
///
/// Year-over-year change is 0 when no observation exists for the same month
/// one year before the newest one.
fn inflation_snapshot(observations: &[Observation]) -> Result<InflationSnapshot, FredError> {
    let (current, previous) = match observations {
        [current, previous, ..] => (current, previous),
        _ => {
            return Err(FredError::InsufficientData {
                needed: 2,
                found: observations.len(),
            })
        }
    };

    let year_ago = observations.iter().find(|o| {
        o.date.year() == current.date.year() - 1 && o.date.month() == current.date.month()
    });

    Ok(InflationSnapshot {
        current_cpi: current.value,
        year_over_year_change: year_ago
            .map(|o| percent_change(current.value, o.value))
            .unwrap_or(0.0),
        month_over_month_change: percent_change(current.value, previous.value),
        base_year: CPI_BASE_YEAR,
        last_updated: current.date,
    })
}

/// Scales `amount` by the ratio of the last to the first CPI observation
/// (inverted when adjusting backwards in time)
fn scale_by_cpi(amount: f64, observations: &[Observation], backwards: bool) -> f64 {
    let (Some(first), Some(last)) = (observations.first(), observations.last()) else {
        return amount;
    };
    if observations.len() < 2 {
        return amount;
    }

    if backwards {
        amount * (first.value / last.value)
    } else {
        amount * (last.value / first.value)
    }
}

/// Formats an amount in billions of dollars
fn format_billions(billions: f64) -> String {
    if billions >= 1000.0 {
        format!("${:.2} trillion", billions / 1000.0)
    } else {
        format!("${:.1} billion", billions)
    }
}
