//! Upstream data clients and their shared value types
//!
//! Each client (Treasury, FRED, College Scorecard) fetches from one public
//! API, normalizes the upstream JSON into the types below or its own, and
//! keeps its own time-boxed cache.

pub mod fred;
pub mod policy;
pub mod scorecard;
pub mod treasury;

pub use fred::{
    EconomicIndicators, FredClient, FredError, InflationSnapshot, ObservationQuery, PovertyContext,
    SeriesId, SeriesMeta, TotalStudentLoans,
};
pub use policy::{current_policy, policy_for, PolicyYear};
pub use scorecard::{
    CodeFilter, Ownership, SchoolFinancialAid, SchoolRecord, SchoolSuggestion, ScorecardClient,
    ScorecardError, SearchMetadata, SearchParams, SearchResponse,
};
pub use treasury::{
    DebtSnapshot, InterestRate, RateTrend, StudentLoanRateContext, TreasuryClient, TreasuryError,
    TreasuryFilters,
};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sort direction accepted by every upstream API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest / smallest first
    #[default]
    Asc,
    /// Newest / largest first
    Desc,
}

impl SortOrder {
    /// The lowercase token the upstream APIs expect
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A single dated value from an economic time series
///
/// Upstream "missing value" sentinels never reach this type: observations
/// without a value are dropped at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date
    pub date: NaiveDate,
    /// Observed value
    pub value: f64,
}

/// Percentage change from `reference` to `current`
pub(crate) fn percent_change(current: f64, reference: f64) -> f64 {
    (current - reference) / reference * 100.0
}

/// The date `months` calendar months before `date`, clamped to month end
pub(crate) fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN)
}

/// Formats a date the way every upstream API expects (YYYY-MM-DD)
pub(crate) fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
