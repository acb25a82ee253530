//! U.S. Treasury Fiscal Data API client
//!
//! Fetches average interest rates on Treasury securities and the public debt
//! ("debt to the penny") series, and derives student-loan rate context and
//! yearly rate trends from them. The API needs no key.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::policy::{current_policy, FederalLoanRates};
use super::{iso_date, months_before, SortOrder};
use crate::cache::{cache_key, CacheManager};

/// Base URL for the Fiscal Data API
const TREASURY_BASE_URL: &str = "https://api.fiscaldata.treasury.gov/services/api/fiscal_service";

/// Average interest rates on U.S. Treasury securities
const INTEREST_RATES_PATH: &str = "/v2/accounting/od/avg_interest_rates";

/// Total public debt outstanding
const DEBT_PATH: &str = "/v2/accounting/od/debt_to_penny";

const INTEREST_RATE_FIELDS: &str = "record_date,security_type_desc,avg_interest_rate_amt";
const DEBT_FIELDS: &str = "record_date,debt_held_public_amt,intragov_hold_amt,tot_pub_debt_out_amt";

/// Time-to-live for Treasury cache entries in hours
const CACHE_TTL_HOURS: i64 = 1;

const DEFAULT_RATES_LIMIT: u32 = 100;
const DEFAULT_DEBT_LIMIT: u32 = 30;
const LATEST_RATES_LIMIT: u32 = 20;
const TRENDS_LIMIT: u32 = 1000;

/// Errors that can occur when fetching Treasury data
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Treasury API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Average interest rate for one security type on one record date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRate {
    pub record_date: NaiveDate,
    pub security_type_desc: String,
    pub avg_interest_rate_amt: f64,
}

/// Public debt totals on one record date, in dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSnapshot {
    pub record_date: NaiveDate,
    pub debt_held_by_public: f64,
    pub intragovernmental_holdings: f64,
    pub total_public_debt_outstanding: f64,
}

/// Live Treasury yields next to the fixed federal student loan rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoanRateContext {
    /// Latest average rate on Treasury notes, if reported
    pub treasury_note_rate: Option<f64>,
    /// Latest average rate on Treasury bonds, if reported
    pub treasury_bond_rate: Option<f64>,
    /// Record date of the newest rate row, or today when none came back
    pub last_updated: NaiveDate,
    /// Award year the federal rates apply to
    pub award_year: String,
    pub federal_student_loan_rates: FederalLoanRates,
}

/// Mean average-interest-rate across all rows of one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTrend {
    pub year: i32,
    pub avg_rate: f64,
}

/// Query filters shared by the Treasury endpoints
///
/// `security_type` only applies to interest rates. Unset `limit` and
/// `sort_order` fall back to per-endpoint defaults (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreasuryFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub security_type: Option<String>,
    pub limit: Option<u32>,
    pub sort_order: Option<SortOrder>,
}

/// Fiscal Data response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: Vec<T>,
}

/// Fiscal Data reports amounts as strings ("4.125"), occasionally as numbers,
/// and uses the string "null" for missing values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn value(&self) -> Option<f64> {
        match self {
            RawAmount::Number(n) => Some(*n),
            RawAmount::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn amount(raw: &Option<RawAmount>) -> Option<f64> {
    raw.as_ref().and_then(RawAmount::value)
}

/// A single average-interest-rate row from the API
#[derive(Debug, Deserialize)]
struct RateRecord {
    record_date: NaiveDate,
    #[serde(default)]
    security_type_desc: Option<String>,
    #[serde(default)]
    avg_interest_rate_amt: Option<RawAmount>,
}

impl RateRecord {
    /// Rows without a usable rate are dropped
    fn normalize(self) -> Option<InterestRate> {
        let rate = amount(&self.avg_interest_rate_amt)?;
        Some(InterestRate {
            record_date: self.record_date,
            security_type_desc: self.security_type_desc.unwrap_or_default(),
            avg_interest_rate_amt: rate,
        })
    }
}

/// A single debt-to-the-penny row from the API
#[derive(Debug, Deserialize)]
struct DebtRecord {
    record_date: NaiveDate,
    #[serde(default)]
    debt_held_public_amt: Option<RawAmount>,
    #[serde(default)]
    intragov_hold_amt: Option<RawAmount>,
    #[serde(default)]
    tot_pub_debt_out_amt: Option<RawAmount>,
}

impl DebtRecord {
    fn normalize(self) -> DebtSnapshot {
        DebtSnapshot {
            record_date: self.record_date,
            debt_held_by_public: amount(&self.debt_held_public_amt).unwrap_or(0.0),
            intragovernmental_holdings: amount(&self.intragov_hold_amt).unwrap_or(0.0),
            total_public_debt_outstanding: amount(&self.tot_pub_debt_out_amt).unwrap_or(0.0),
        }
    }
}

/// Client for the Treasury Fiscal Data API
#[derive(Debug, Clone)]
pub struct TreasuryClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cache for normalized responses
    cache: CacheManager,
    /// Base URL for the API (overridable only in tests)
    base_url: String,
}

impl Default for TreasuryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TreasuryClient {
    /// Creates a new TreasuryClient with its own empty cache
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a new TreasuryClient with a custom HTTP client
    pub fn with_client(http_client: Client) -> Self {
        Self {
            http_client,
            cache: CacheManager::new(),
            base_url: TREASURY_BASE_URL.to_string(),
        }
    }

    /// Creates a new TreasuryClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new()
        }
    }

    /// Fetches average interest rates matching `filters`
    ///
    /// Results are cached for an hour per distinct filter set.
    pub async fn get_interest_rates(
        &self,
        filters: &TreasuryFilters,
    ) -> Result<Vec<InterestRate>, TreasuryError> {
        let key = cache_key("rates", filters);
        if let Some(cached) = self.cache.read::<Vec<InterestRate>>(&key) {
            log::debug!("treasury: cache hit {}", key);
            return Ok(cached);
        }

        let query = build_query(
            INTEREST_RATE_FIELDS,
            filters,
            filter_expression(filters, true),
            DEFAULT_RATES_LIMIT,
        );
        let response: ApiResponse<RateRecord> = self.fetch(INTEREST_RATES_PATH, &query).await?;
        let rates: Vec<InterestRate> = response
            .data
            .into_iter()
            .filter_map(RateRecord::normalize)
            .collect();

        self.cache.write(&key, &rates, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(rates)
    }

    /// Fetches the 20 most recent interest rate rows
    pub async fn get_latest_interest_rates(&self) -> Result<Vec<InterestRate>, TreasuryError> {
        let filters = TreasuryFilters {
            limit: Some(LATEST_RATES_LIMIT),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        self.get_interest_rates(&filters).await
    }

    /// Fetches public debt snapshots matching `filters` (30 rows by default)
    pub async fn get_debt_data(
        &self,
        filters: &TreasuryFilters,
    ) -> Result<Vec<DebtSnapshot>, TreasuryError> {
        let key = cache_key("debt", filters);
        if let Some(cached) = self.cache.read::<Vec<DebtSnapshot>>(&key) {
            log::debug!("treasury: cache hit {}", key);
            return Ok(cached);
        }

        let query = build_query(
            DEBT_FIELDS,
            filters,
            filter_expression(filters, false),
            DEFAULT_DEBT_LIMIT,
        );
        let response: ApiResponse<DebtRecord> = self.fetch(DEBT_PATH, &query).await?;
        let debt: Vec<DebtSnapshot> = response.data.into_iter().map(DebtRecord::normalize).collect();

        self.cache.write(&key, &debt, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(debt)
    }

    /// Pairs the latest Treasury note and bond rates with the fixed federal
    /// student loan rates for the current award year
    pub async fn get_student_loan_rate_context(
        &self,
    ) -> Result<StudentLoanRateContext, TreasuryError> {
        let rates = self.get_latest_interest_rates().await?;
        Ok(rate_context(&rates, Utc::now().date_naive()))
    }

    /// Yearly mean interest rate over the trailing `years` years, oldest first
    ///
    /// Years without any rows are absent rather than zero-filled.
    pub async fn get_interest_rate_trends(&self, years: u32) -> Result<Vec<RateTrend>, TreasuryError> {
        let today = Utc::now().date_naive();
        let filters = TreasuryFilters {
            start_date: Some(months_before(today, years.saturating_mul(12))),
            end_date: Some(today),
            limit: Some(TRENDS_LIMIT),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };

        let rates = self.get_interest_rates(&filters).await?;
        let trends = yearly_averages(&rates);
        log::info!("treasury: {} rate rows averaged into {} years", rates.len(), trends.len());
        Ok(trends)
    }

    /// Issues a GET against `path` and decodes a successful JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TreasuryError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("treasury: GET {} {:?}", url, query);

        let response = self.http_client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TreasuryError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Builds the comma-joined `field:op:value` filter clause list
fn filter_expression(filters: &TreasuryFilters, with_security_type: bool) -> Option<String> {
    let mut clauses = Vec::new();

    if let Some(start) = filters.start_date {
        clauses.push(format!("record_date:gte:{}", iso_date(start)));
    }
    if let Some(end) = filters.end_date {
        clauses.push(format!("record_date:lte:{}", iso_date(end)));
    }
    if with_security_type {
        if let Some(ref security_type) = filters.security_type {
            clauses.push(format!("security_type_desc:eq:{}", security_type));
        }
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(","))
    }
}

/// Assembles the query string pairs for a Fiscal Data request
fn build_query(
    fields: &str,
    filters: &TreasuryFilters,
    filter: Option<String>,
    default_limit: u32,
) -> Vec<(&'static str, String)> {
    let sort = match filters.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => "record_date",
        SortOrder::Desc => "-record_date",
    };

    let mut query = vec![("fields", fields.to_string())];
    if let Some(filter) = filter {
        query.push(("filter", filter));
    }
    query.push(("sort", sort.to_string()));
    query.push(("page[size]", filters.limit.unwrap_or(default_limit).to_string()));
    query
}

/// First rate whose security type contains `needle`, case-insensitively
fn find_rate(rates: &[InterestRate], needle: &str) -> Option<f64> {
    rates
        .iter()
        .find(|r| r.security_type_desc.to_lowercase().contains(needle))
        .map(|r| r.avg_interest_rate_amt)
}

fn rate_context(rates: &[InterestRate], today: NaiveDate) -> StudentLoanRateContext {
    let policy = current_policy();
    StudentLoanRateContext {
        treasury_note_rate: find_rate(rates, "treasury note"),
        treasury_bond_rate: find_rate(rates, "treasury bond"),
        last_updated: rates.first().map(|r| r.record_date).unwrap_or(today),
        award_year: policy.award_year.to_string(),
        federal_student_loan_rates: policy.loan_rates,
    }
}

/// Groups rate rows by calendar year and averages each group
fn yearly_averages(rates: &[InterestRate]) -> Vec<RateTrend> {
    let mut by_year: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    for rate in rates {
        let entry = by_year.entry(rate.record_date.year()).or_insert((0.0, 0));
        entry.0 += rate.avg_interest_rate_amt;
        entry.1 += 1;
    }

    by_year
        .into_iter()
        .map(|(year, (sum, count))| RateTrend {
            year,
            avg_rate: sum / count as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(record_date: NaiveDate, desc: &str, amt: f64) -> InterestRate {
        InterestRate {
            record_date,
            security_type_desc: desc.to_string(),
            avg_interest_rate_amt: amt,
        }
    }

    const RATES_RESPONSE: &str = r#"{
        "data": [
            {"record_date": "2024-09-30", "security_type_desc": "Treasury Bills", "avg_interest_rate_amt": "5.123"},
            {"record_date": "2024-09-30", "security_type_desc": "Treasury Notes", "avg_interest_rate_amt": "4.2"},
            {"record_date": "2024-09-30", "security_type_desc": "Treasury Bonds", "avg_interest_rate_amt": "3.3"},
            {"record_date": "2024-09-30", "security_type_desc": "Federal Financing Bank", "avg_interest_rate_amt": "null"}
        ],
        "meta": {"count": 4}
    }"#;

    #[test]
    fn test_filter_expression_with_all_filters() {
        let filters = TreasuryFilters {
            start_date: Some(date(2023, 1, 1)),
            end_date: Some(date(2024, 1, 1)),
            security_type: Some("Marketable".to_string()),
            ..Default::default()
        };

        assert_eq!(
            filter_expression(&filters, true).as_deref(),
            Some("record_date:gte:2023-01-01,record_date:lte:2024-01-01,security_type_desc:eq:Marketable")
        );
        assert_eq!(
            filter_expression(&filters, false).as_deref(),
            Some("record_date:gte:2023-01-01,record_date:lte:2024-01-01")
        );
    }

    #[test]
    fn test_filter_expression_empty() {
        assert!(filter_expression(&TreasuryFilters::default(), true).is_none());
    }

    #[test]
    fn test_build_query_defaults_to_newest_first() {
        let query = build_query(DEBT_FIELDS, &TreasuryFilters::default(), None, DEFAULT_DEBT_LIMIT);

        assert!(query.contains(&("sort", "-record_date".to_string())));
        assert!(query.contains(&("page[size]", "30".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "filter"));
    }

    #[test]
    fn test_build_query_ascending_with_limit() {
        let filters = TreasuryFilters {
            limit: Some(1000),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let query = build_query(INTEREST_RATE_FIELDS, &filters, Some("x:eq:y".into()), 100);

        assert_eq!(query[0], ("fields", INTEREST_RATE_FIELDS.to_string()));
        assert!(query.contains(&("filter", "x:eq:y".to_string())));
        assert!(query.contains(&("sort", "record_date".to_string())));
        assert!(query.contains(&("page[size]", "1000".to_string())));
    }

    #[test]
    fn test_rate_context_note_without_bond() {
        let rates = vec![rate(date(2024, 9, 30), "Treasury Notes", 4.2)];
        let context = rate_context(&rates, date(2024, 10, 15));

        assert_eq!(context.treasury_note_rate, Some(4.2));
        assert_eq!(context.treasury_bond_rate, None);
        assert_eq!(context.last_updated, date(2024, 9, 30));
        assert_eq!(context.federal_student_loan_rates, current_policy().loan_rates);
    }

    #[test]
    fn test_rate_context_matches_case_insensitively() {
        let rates = vec![
            rate(date(2024, 9, 30), "TREASURY BONDS", 3.3),
            rate(date(2024, 9, 30), "treasury notes", 4.1),
        ];
        let context = rate_context(&rates, date(2024, 10, 15));

        assert_eq!(context.treasury_note_rate, Some(4.1));
        assert_eq!(context.treasury_bond_rate, Some(3.3));
    }

    #[test]
    fn test_rate_context_empty_uses_today() {
        let context = rate_context(&[], date(2024, 10, 15));

        assert!(context.treasury_note_rate.is_none());
        assert!(context.treasury_bond_rate.is_none());
        assert_eq!(context.last_updated, date(2024, 10, 15));
    }

    #[test]
    fn test_yearly_averages_groups_three_years() {
        let rates = vec![
            rate(date(2022, 1, 31), "Treasury Notes", 1.0),
            rate(date(2022, 6, 30), "Treasury Notes", 2.0),
            rate(date(2023, 3, 31), "Treasury Notes", 3.0),
            rate(date(2024, 2, 29), "Treasury Notes", 4.0),
            rate(date(2024, 5, 31), "Treasury Bonds", 5.0),
            rate(date(2024, 8, 31), "Treasury Bills", 6.0),
        ];

        let trends = yearly_averages(&rates);

        assert_eq!(trends.len(), 3);
        assert_eq!(trends[0], RateTrend { year: 2022, avg_rate: 1.5 });
        assert_eq!(trends[1], RateTrend { year: 2023, avg_rate: 3.0 });
        assert_eq!(trends[2], RateTrend { year: 2024, avg_rate: 5.0 });
    }

    #[test]
    fn test_yearly_averages_skips_empty_years() {
        let rates = vec![
            rate(date(2020, 1, 31), "Treasury Notes", 1.0),
            rate(date(2023, 1, 31), "Treasury Notes", 3.0),
        ];

        let years: Vec<i32> = yearly_averages(&rates).iter().map(|t| t.year).collect();
        assert_eq!(years, vec![2020, 2023]);
    }

    #[test]
    fn test_debt_record_defaults_missing_amounts() {
        let record: DebtRecord = serde_json::from_str(
            r#"{"record_date": "2024-10-01", "debt_held_public_amt": "28000000000000.50", "tot_pub_debt_out_amt": 35000000000000}"#,
        )
        .unwrap();

        let snapshot = record.normalize();
        assert!((snapshot.debt_held_by_public - 28_000_000_000_000.5).abs() < 1.0);
        assert_eq!(snapshot.intragovernmental_holdings, 0.0);
        assert!((snapshot.total_public_debt_outstanding - 35e12).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_get_interest_rates_parses_and_drops_null_rates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", INTEREST_RATES_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fields".into(), INTEREST_RATE_FIELDS.into()),
                Matcher::UrlEncoded("sort".into(), "-record_date".into()),
                Matcher::UrlEncoded("page[size]".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RATES_RESPONSE)
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let rates = client.get_latest_interest_rates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[1].security_type_desc, "Treasury Notes");
        assert!((rates[1].avg_interest_rate_amt - 4.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_get_interest_rates_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", INTEREST_RATES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(RATES_RESPONSE)
            .expect(1)
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let first = client.get_latest_interest_rates().await.unwrap();
        let second = client.get_latest_interest_rates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", DEBT_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let result = client.get_debt_data(&TreasuryFilters::default()).await;

        match result {
            Err(TreasuryError::Upstream { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_student_loan_rate_context_from_live_rates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", INTEREST_RATES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"data": [{"record_date": "2024-09-30", "security_type_desc": "Treasury Notes", "avg_interest_rate_amt": "4.2"}]}"#,
            )
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let context = client.get_student_loan_rate_context().await.unwrap();

        assert_eq!(context.treasury_note_rate, Some(4.2));
        assert_eq!(context.treasury_bond_rate, None);
        assert_eq!(context.award_year, "2024-2025");
    }

    #[tokio::test]
    async fn test_interest_rate_trends_requests_ascending_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", INTEREST_RATES_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "record_date".into()),
                Matcher::UrlEncoded("page[size]".into(), "1000".into()),
                Matcher::Regex("filter=record_date".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"record_date": "2022-12-31", "security_type_desc": "Treasury Notes", "avg_interest_rate_amt": "2.0"},
                    {"record_date": "2023-12-31", "security_type_desc": "Treasury Notes", "avg_interest_rate_amt": "3.0"},
                    {"record_date": "2023-06-30", "security_type_desc": "Treasury Bonds", "avg_interest_rate_amt": "4.0"},
                    {"record_date": "2024-06-30", "security_type_desc": "Treasury Notes", "avg_interest_rate_amt": "4.5"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let trends = client.get_interest_rate_trends(3).await.unwrap();

        mock.assert_async().await;
        assert_eq!(trends.len(), 3);
        assert_eq!(trends[0].year, 2022);
        assert!((trends[1].avg_rate - 3.5).abs() < 1e-9);
        assert_eq!(trends[2].year, 2024);
    }

    #[tokio::test]
    async fn test_latest_interest_rates_newest_twenty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", INTEREST_RATES_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "-record_date".into()),
                Matcher::UrlEncoded("page[size]".into(), "20".into()),
                Matcher::UrlEncoded("fields".into(), INTEREST_RATE_FIELDS.into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let rates = client.get_latest_interest_rates().await.unwrap();

        mock.assert_async().await;
        assert!(rates.is_empty());
    }

    #[tokio::test]
    async fn test_get_debt_data_normalizes_amounts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", DEBT_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fields".into(), DEBT_FIELDS.into()),
                Matcher::UrlEncoded("page[size]".into(), "30".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"data": [{
                    "record_date": "2024-09-30",
                    "debt_held_public_amt": "28303523148027.49",
                    "intragov_hold_amt": "7160860340960.62",
                    "tot_pub_debt_out_amt": "35464383488988.11"
                }]}"#,
            )
            .create_async()
            .await;

        let client = TreasuryClient::with_base_url(server.url());
        let debt = client.get_debt_data(&TreasuryFilters::default()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(debt.len(), 1);
        assert_eq!(debt[0].record_date, NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
        assert!((debt[0].total_public_debt_outstanding - 35_464_383_488_988.11).abs() < 0.01);
    }
}
