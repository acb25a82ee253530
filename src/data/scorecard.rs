//! College Scorecard API client
//!
//! Searches U.S. Department of Education school records and normalizes the
//! API's flattened, dotted field names (`"school.name"`,
//! `"latest.aid.pell_grant_rate"`, ...) into [`SchoolRecord`]. The dotted
//! shape never leaves this module.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::SortOrder;
use crate::cache::{cache_key, CacheManager};

/// Base URL for the College Scorecard API
const SCORECARD_BASE_URL: &str = "https://api.data.gov/ed/collegescorecard/v1";

const SCHOOLS_PATH: &str = "/schools";

/// Time-to-live for Scorecard cache entries in hours
const CACHE_TTL_HOURS: i64 = 24;

const DEFAULT_PER_PAGE: u32 = 20;
const DEFAULT_DISTANCE_MILES: u32 = 50;
const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 10;

/// Shortest query autocomplete will send upstream
const MIN_AUTOCOMPLETE_CHARS: usize = 3;

/// Upstream fields projected for a full school record
///
/// Each entry maps onto one field of [`SchoolRecord`] through the matching
/// `rename` on `RawSchool`.
pub const SCHOOL_FIELDS: [&str; 20] = [
    "id",
    "school.name",
    "school.city",
    "school.state",
    "school.zip",
    "school.school_url",
    "school.ownership",
    "latest.student.size",
    "latest.cost.tuition.in_state",
    "latest.cost.tuition.out_of_state",
    "latest.cost.avg_net_price.overall",
    "latest.aid.pell_grant_rate",
    "latest.aid.federal_loan_rate",
    "latest.aid.median_debt.completers.overall",
    "latest.aid.median_debt.completers.monthly_payments",
    "latest.admissions.admission_rate.overall",
    "latest.completion.completion_rate_4yr_150nt",
    "latest.earnings.10_yrs_after_entry.median",
    "location.lat",
    "location.lon",
];

/// Upstream fields projected for autocomplete suggestions
const SUGGESTION_FIELDS: [&str; 4] = ["id", "school.name", "school.city", "school.state"];

/// Errors that can occur when fetching Scorecard data
#[derive(Debug, Error)]
pub enum ScorecardError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("College Scorecard API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Institutional control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ownership {
    #[default]
    Public,
    PrivateNonprofit,
    PrivateForProfit,
}

impl Ownership {
    /// Maps a Scorecard ownership code; unknown codes fall back to `Public`
    pub fn from_code(code: i64) -> Ownership {
        match code {
            2 => Ownership::PrivateNonprofit,
            3 => Ownership::PrivateForProfit,
            _ => Ownership::Public,
        }
    }

    /// The Scorecard ownership code
    pub fn code(&self) -> u8 {
        match self {
            Ownership::Public => 1,
            Ownership::PrivateNonprofit => 2,
            Ownership::PrivateForProfit => 3,
        }
    }
}

/// Normalized school record
///
/// Missing numeric fields are 0 and missing text fields are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRecord {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub website: String,
    pub ownership: Ownership,
    pub student_size: u64,
    pub in_state_tuition: f64,
    pub out_of_state_tuition: f64,
    pub avg_net_price: f64,
    pub pell_grant_rate: f64,
    pub federal_loan_rate: f64,
    pub median_debt: f64,
    pub monthly_payment: f64,
    pub admission_rate: f64,
    pub graduation_rate: f64,
    pub median_earnings: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Paging information for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMetadata {
    pub total: u64,
    pub page: u32,
    #[serde(alias = "per_page")]
    pub per_page: u32,
}

/// One page of normalized search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub metadata: SearchMetadata,
    pub results: Vec<SchoolRecord>,
}

/// Minimal record returned by autocomplete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSuggestion {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub state: String,
}

/// Aid-related subset of a school record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFinancialAid {
    pub pell_grant_rate: f64,
    pub federal_loan_rate: f64,
    pub median_debt: f64,
    pub monthly_payment: f64,
    pub avg_net_price: f64,
}

impl From<&SchoolRecord> for SchoolFinancialAid {
    fn from(school: &SchoolRecord) -> Self {
        SchoolFinancialAid {
            pell_grant_rate: school.pell_grant_rate,
            federal_loan_rate: school.federal_loan_rate,
            median_debt: school.median_debt,
            monthly_payment: school.monthly_payment,
            avg_net_price: school.avg_net_price,
        }
    }
}

/// One code or a list of codes (joined with commas upstream)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeFilter {
    One(u8),
    Many(Vec<u8>),
}

impl CodeFilter {
    fn to_param(&self) -> String {
        match self {
            CodeFilter::One(code) => code.to_string(),
            CodeFilter::Many(codes) => codes
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<u8> for CodeFilter {
    fn from(code: u8) -> Self {
        CodeFilter::One(code)
    }
}

impl From<Vec<u8>> for CodeFilter {
    fn from(codes: Vec<u8>) -> Self {
        CodeFilter::Many(codes)
    }
}

/// Search filters; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text school name
    pub name: Option<String>,
    /// Two-letter state code
    pub state: Option<String>,
    pub city: Option<String>,
    /// Center of a radius search
    pub zip: Option<String>,
    /// Radius in miles around `zip`
    pub distance: Option<u32>,
    /// Ownership code(s): 1 public, 2 private nonprofit, 3 private for-profit
    pub ownership: Option<CodeFilter>,
    /// Predominant degree code(s)
    pub degree_type: Option<CodeFilter>,
    pub student_size_min: Option<u64>,
    pub student_size_max: Option<u64>,
    /// Upstream field to sort by, e.g. "latest.student.size"
    pub sort: Option<String>,
    pub sort_direction: Option<SortOrder>,
    /// Zero-based page index
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A single flattened result row from the API
#[derive(Debug, Deserialize)]
struct RawSchool {
    id: Option<u64>,
    #[serde(rename = "school.name")]
    name: Option<String>,
    #[serde(rename = "school.city")]
    city: Option<String>,
    #[serde(rename = "school.state")]
    state: Option<String>,
    #[serde(rename = "school.zip")]
    zip: Option<Value>,
    #[serde(rename = "school.school_url")]
    website: Option<String>,
    #[serde(rename = "school.ownership")]
    ownership: Option<i64>,
    #[serde(rename = "latest.student.size")]
    student_size: Option<f64>,
    #[serde(rename = "latest.cost.tuition.in_state")]
    in_state_tuition: Option<f64>,
    #[serde(rename = "latest.cost.tuition.out_of_state")]
    out_of_state_tuition: Option<f64>,
    #[serde(rename = "latest.cost.avg_net_price.overall")]
    avg_net_price: Option<f64>,
    #[serde(rename = "latest.aid.pell_grant_rate")]
    pell_grant_rate: Option<f64>,
    #[serde(rename = "latest.aid.federal_loan_rate")]
    federal_loan_rate: Option<f64>,
    #[serde(rename = "latest.aid.median_debt.completers.overall")]
    median_debt: Option<f64>,
    #[serde(rename = "latest.aid.median_debt.completers.monthly_payments")]
    monthly_payment: Option<f64>,
    #[serde(rename = "latest.admissions.admission_rate.overall")]
    admission_rate: Option<f64>,
    #[serde(rename = "latest.completion.completion_rate_4yr_150nt")]
    graduation_rate: Option<f64>,
    #[serde(rename = "latest.earnings.10_yrs_after_entry.median")]
    median_earnings: Option<f64>,
    #[serde(rename = "location.lat")]
    latitude: Option<f64>,
    #[serde(rename = "location.lon")]
    longitude: Option<f64>,
}

impl RawSchool {
    fn normalize(self) -> SchoolRecord {
        SchoolRecord {
            id: self.id.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            zip: self.zip.as_ref().map(value_text).unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            ownership: self.ownership.map(Ownership::from_code).unwrap_or_default(),
            student_size: self.student_size.map(|s| s.max(0.0) as u64).unwrap_or(0),
            in_state_tuition: self.in_state_tuition.unwrap_or(0.0),
            out_of_state_tuition: self.out_of_state_tuition.unwrap_or(0.0),
            avg_net_price: self.avg_net_price.unwrap_or(0.0),
            pell_grant_rate: self.pell_grant_rate.unwrap_or(0.0),
            federal_loan_rate: self.federal_loan_rate.unwrap_or(0.0),
            median_debt: self.median_debt.unwrap_or(0.0),
            monthly_payment: self.monthly_payment.unwrap_or(0.0),
            admission_rate: self.admission_rate.unwrap_or(0.0),
            graduation_rate: self.graduation_rate.unwrap_or(0.0),
            median_earnings: self.median_earnings.unwrap_or(0.0),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    fn suggestion(self) -> SchoolSuggestion {
        SchoolSuggestion {
            id: self.id.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
        }
    }
}

/// ZIP codes arrive as strings ("94305-2004") or, for some rows, numbers
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Scorecard response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    metadata: SearchMetadata,
    #[serde(default)]
    results: Vec<RawSchool>,
}

/// Client for the College Scorecard API
#[derive(Debug, Clone)]
pub struct ScorecardClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cache for normalized responses
    cache: CacheManager,
    api_key: String,
    /// Base URL for the API (overridable only in tests)
    base_url: String,
}

impl ScorecardClient {
    /// Creates a new ScorecardClient authenticating with `api_key`
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Creates a new ScorecardClient with a custom HTTP client
    pub fn with_client(http_client: Client, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            cache: CacheManager::new(),
            api_key: api_key.into(),
            base_url: SCORECARD_BASE_URL.to_string(),
        }
    }

    /// Creates a new ScorecardClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new("test-key")
        }
    }

    /// Searches schools, one page at a time
    pub async fn search_schools(&self, params: &SearchParams) -> Result<SearchResponse, ScorecardError> {
        let key = cache_key("search", params);
        if let Some(cached) = self.cache.read::<SearchResponse>(&key) {
            log::debug!("scorecard: cache hit {}", key);
            return Ok(cached);
        }

        let response: ApiResponse = self.fetch(&search_query(params)).await?;
        let result = SearchResponse {
            metadata: response.metadata,
            results: response.results.into_iter().map(RawSchool::normalize).collect(),
        };

        self.cache.write(&key, &result, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(result)
    }

    /// Looks up one school, `None` if the id is unknown
    pub async fn get_school_by_id(&self, id: u64) -> Result<Option<SchoolRecord>, ScorecardError> {
        let key = format!("school:{}", id);
        if let Some(cached) = self.cache.read::<SchoolRecord>(&key) {
            log::debug!("scorecard: cache hit {}", key);
            return Ok(Some(cached));
        }

        let query = [("id", id.to_string()), ("_fields", SCHOOL_FIELDS.join(","))];
        let response: ApiResponse = self.fetch(&query).await?;
        let school = response.results.into_iter().next().map(RawSchool::normalize);

        if let Some(ref school) = school {
            self.cache.write(&key, school, chrono::Duration::hours(CACHE_TTL_HOURS));
        }
        Ok(school)
    }

    /// Schools within `distance_miles` (50 when `None`) of a ZIP code
    pub async fn get_schools_near_zip(
        &self,
        zip: &str,
        distance_miles: Option<u32>,
        extra: SearchParams,
    ) -> Result<SearchResponse, ScorecardError> {
        let params = SearchParams {
            zip: Some(zip.to_string()),
            distance: Some(distance_miles.unwrap_or(DEFAULT_DISTANCE_MILES)),
            ..extra
        };
        self.search_schools(&params).await
    }

    /// Schools in one state
    pub async fn get_schools_by_state(
        &self,
        state: &str,
        extra: SearchParams,
    ) -> Result<SearchResponse, ScorecardError> {
        let params = SearchParams {
            state: Some(state.to_uppercase()),
            ..extra
        };
        self.search_schools(&params).await
    }

    /// Name suggestions for a partial query (10 when `limit` is `None`)
    ///
    /// Queries shorter than three characters return no suggestions without
    /// contacting the API.
    pub async fn autocomplete_schools(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SchoolSuggestion>, ScorecardError> {
        if query.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT);

        let key = format!("autocomplete:{}:{}", query.to_lowercase(), limit);
        if let Some(cached) = self.cache.read::<Vec<SchoolSuggestion>>(&key) {
            log::debug!("scorecard: cache hit {}", key);
            return Ok(cached);
        }

        let params = [
            ("school.name", query.to_string()),
            ("_fields", SUGGESTION_FIELDS.join(",")),
            ("_per_page", limit.to_string()),
        ];
        let response: ApiResponse = self.fetch(&params).await?;
        let suggestions: Vec<SchoolSuggestion> =
            response.results.into_iter().map(RawSchool::suggestion).collect();

        self.cache.write(&key, &suggestions, chrono::Duration::hours(CACHE_TTL_HOURS));
        Ok(suggestions)
    }

    /// Aid statistics for one school, `None` if the id is unknown
    pub async fn get_school_financial_aid(
        &self,
        id: u64,
    ) -> Result<Option<SchoolFinancialAid>, ScorecardError> {
        let school = self.get_school_by_id(id).await?;
        Ok(school.as_ref().map(SchoolFinancialAid::from))
    }

    /// Issues a GET against the schools endpoint and decodes a successful body
    async fn fetch<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<T, ScorecardError> {
        let url = format!("{}{}", self.base_url, SCHOOLS_PATH);
        log::debug!("scorecard: GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ScorecardError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Translates search filters into Scorecard query parameters
fn search_query(params: &SearchParams) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();

    if let Some(ref name) = params.name {
        query.push(("school.name", name.clone()));
    }
    if let Some(ref state) = params.state {
        query.push(("school.state", state.clone()));
    }
    if let Some(ref city) = params.city {
        query.push(("school.city", city.clone()));
    }
    if let Some(ref zip) = params.zip {
        query.push(("zip", zip.clone()));
        if let Some(distance) = params.distance {
            query.push(("distance", format!("{}mi", distance)));
        }
    }
    if let Some(ref ownership) = params.ownership {
        query.push(("school.ownership", ownership.to_param()));
    }
    if let Some(ref degree_type) = params.degree_type {
        query.push(("school.degrees_awarded.predominant", degree_type.to_param()));
    }
    if params.student_size_min.is_some() || params.student_size_max.is_some() {
        let bound = |b: Option<u64>| b.map(|v| v.to_string()).unwrap_or_default();
        query.push((
            "latest.student.size__range",
            format!("{}..{}", bound(params.student_size_min), bound(params.student_size_max)),
        ));
    }
    if let Some(ref sort) = params.sort {
        let direction = params.sort_direction.unwrap_or_default();
        query.push(("_sort", format!("{}:{}", sort, direction.as_str())));
    }

    query.push(("_page", params.page.unwrap_or(0).to_string()));
    query.push(("_per_page", params.per_page.unwrap_or(DEFAULT_PER_PAGE).to_string()));
    query.push(("_fields", SCHOOL_FIELDS.join(",")));
    query
}
