//! Command-line interface parsing for AidScope
//!
//! This module handles parsing of CLI arguments using clap and turns the raw
//! strings into the typed query structures the clients take. All validation
//! happens here, before any request is made.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::data::fred::ObservationQuery;
use crate::data::policy::{current_policy, policy_for, PolicyYear};
use crate::data::scorecard::{CodeFilter, SearchParams};
use crate::data::treasury::TreasuryFilters;
use crate::data::{SeriesId, SortOrder};

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// A date argument is not a valid YYYY-MM-DD date
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A sort order is neither "asc" nor "desc"
    #[error("Invalid sort order: '{0}'. Valid orders: asc, desc")]
    InvalidSortOrder(String),

    /// A sort spec is not `field[:asc|:desc]`
    #[error("Invalid sort: '{0}'. Expected field[:asc|:desc]")]
    InvalidSort(String),

    /// A year span of zero
    #[error("Invalid years: {0}. Must be at least 1")]
    InvalidYears(u32),

    /// No policy table for the requested award year
    #[error("Unknown award year: '{0}'")]
    UnknownAwardYear(String),
}

/// AidScope - financial-aid context data from College Scorecard, FRED, and the U.S. Treasury
#[derive(Parser, Debug)]
#[command(name = "aidscope")]
#[command(about = "Financial-aid context data: school costs and aid, economic series, Treasury rates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per client operation; results print as JSON
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Average interest rates on Treasury securities
    Rates {
        #[command(flatten)]
        range: RangeArgs,
        /// Exact security type description, e.g. "Treasury Notes"
        #[arg(long)]
        security_type: Option<String>,
    },
    /// The 20 most recent Treasury interest rate rows
    LatestRates,
    /// Public debt outstanding ("debt to the penny")
    Debt {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Treasury note/bond rates next to federal student loan rates
    RateContext,
    /// Yearly mean Treasury rates
    RateTrends {
        #[arg(long, default_value_t = 5)]
        years: u32,
    },
    /// FRED series metadata
    Series {
        /// FRED series id, e.g. CPIAUCSL
        id: String,
    },
    /// FRED series observations
    Observations {
        id: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Latest observation of a FRED series
    Latest { id: String },
    /// CPI with month-over-month and year-over-year inflation
    Inflation,
    /// CPI, federal funds rate, unemployment, and student loan total
    Indicators,
    /// Outstanding student loan balance
    StudentLoans,
    /// Monthly CPI over the trailing years
    CpiHistory {
        #[arg(long, default_value_t = 5)]
        years: u32,
    },
    /// Restate a dollar amount between years using CPI
    Adjust {
        amount: f64,
        #[arg(long)]
        from: i32,
        #[arg(long)]
        to: i32,
    },
    /// Free-text FRED series search
    SearchSeries {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Poverty guideline with a live inflation factor
    Poverty,
    /// Search College Scorecard schools
    Schools {
        /// School name (free text)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        /// Radius in miles around --zip
        #[arg(long)]
        distance: Option<u32>,
        #[command(flatten)]
        filters: SchoolFilterArgs,
    },
    /// One school by Scorecard id
    School { id: u64 },
    /// Schools around a ZIP code
    NearZip {
        zip: String,
        /// Radius in miles [default: 50]
        #[arg(long)]
        distance: Option<u32>,
        #[command(flatten)]
        filters: SchoolFilterArgs,
    },
    /// Schools in a state
    ByState {
        state: String,
        #[command(flatten)]
        filters: SchoolFilterArgs,
    },
    /// School name suggestions (at least 3 characters)
    Autocomplete {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Aid statistics for one school
    FinancialAid { id: u64 },
    /// Statutory loan rates, poverty guideline, and Pell band
    Policy {
        /// Award year such as 2024-2025 [default: current]
        #[arg(long)]
        year: Option<String>,
    },
}

/// Date window, row limit, and order shared by time-series commands
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// asc or desc
    #[arg(long)]
    pub order: Option<String>,
}

impl RangeArgs {
    /// Builds Treasury filters from the range
    pub fn treasury_filters(&self, security_type: Option<String>) -> Result<TreasuryFilters, CliError> {
        Ok(TreasuryFilters {
            start_date: parse_optional_date(self.start.as_deref())?,
            end_date: parse_optional_date(self.end.as_deref())?,
            security_type,
            limit: self.limit,
            sort_order: self.order.as_deref().map(parse_sort_order).transpose()?,
        })
    }

    /// Builds a FRED observations query from the range
    pub fn observation_query(&self) -> Result<ObservationQuery, CliError> {
        Ok(ObservationQuery {
            start_date: parse_optional_date(self.start.as_deref())?,
            end_date: parse_optional_date(self.end.as_deref())?,
            limit: self.limit,
            sort_order: self.order.as_deref().map(parse_sort_order).transpose()?,
        })
    }
}

/// Filters shared by every school search command
#[derive(Args, Debug, Clone, Default)]
pub struct SchoolFilterArgs {
    /// Ownership codes: 1 public, 2 private nonprofit, 3 private for-profit
    #[arg(long, value_delimiter = ',')]
    pub ownership: Vec<u8>,
    /// Predominant degree codes
    #[arg(long, value_delimiter = ',')]
    pub degree_type: Vec<u8>,
    #[arg(long)]
    pub min_size: Option<u64>,
    #[arg(long)]
    pub max_size: Option<u64>,
    /// Upstream field with optional direction, e.g. latest.student.size:desc
    #[arg(long)]
    pub sort: Option<String>,
    /// Zero-based page
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl SchoolFilterArgs {
    /// Builds search parameters; location fields are left for the caller
    pub fn search_params(&self) -> Result<SearchParams, CliError> {
        let (sort, sort_direction) = match self.sort.as_deref() {
            Some(spec) => {
                let (field, direction) = parse_sort_spec(spec)?;
                (Some(field), Some(direction))
            }
            None => (None, None),
        };

        Ok(SearchParams {
            ownership: code_filter(&self.ownership),
            degree_type: code_filter(&self.degree_type),
            student_size_min: self.min_size,
            student_size_max: self.max_size,
            sort,
            sort_direction,
            page: self.page,
            per_page: self.per_page,
            ..Default::default()
        })
    }
}

fn code_filter(codes: &[u8]) -> Option<CodeFilter> {
    match codes {
        [] => None,
        [code] => Some(CodeFilter::One(*code)),
        many => Some(CodeFilter::Many(many.to_vec())),
    }
}

/// Parses a YYYY-MM-DD date
pub fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, CliError> {
    s.map(parse_date).transpose()
}

/// Parses "asc" or "desc" (case-insensitive)
pub fn parse_sort_order(s: &str) -> Result<SortOrder, CliError> {
    match s.trim().to_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(CliError::InvalidSortOrder(s.to_string())),
    }
}

/// Parses `field[:asc|:desc]`; the direction defaults to ascending
pub fn parse_sort_spec(s: &str) -> Result<(String, SortOrder), CliError> {
    let (field, direction) = match s.split_once(':') {
        Some((field, direction)) => (
            field,
            parse_sort_order(direction).map_err(|_| CliError::InvalidSort(s.to_string()))?,
        ),
        None => (s, SortOrder::Asc),
    };

    let field = field.trim();
    if field.is_empty() || field.contains(char::is_whitespace) {
        return Err(CliError::InvalidSort(s.to_string()));
    }
    Ok((field.to_string(), direction))
}

/// Rejects a zero-year span
pub fn validate_years(years: u32) -> Result<u32, CliError> {
    if years == 0 {
        Err(CliError::InvalidYears(years))
    } else {
        Ok(years)
    }
}

/// Normalizes a series id argument: known ids keep their canonical form,
/// anything else is uppercased
pub fn series_id_arg(s: &str) -> String {
    SeriesId::from_id(s)
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| s.trim().to_uppercase())
}

/// Resolves the policy table for `--year`, defaulting to the current one
pub fn policy_arg(year: Option<&str>) -> Result<&'static PolicyYear, CliError> {
    match year {
        None => Ok(current_policy()),
        Some(year) => policy_for(year.trim()).ok_or_else(|| CliError::UnknownAwardYear(year.to_string())),
    }
}
