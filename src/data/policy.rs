//! Statutory federal aid figures, versioned by award year
//!
//! Federal student loan rates, poverty guidelines, and Pell Grant award
//! bands are set by statute or annual notice, not by markets. They live here
//! as fixed tables and are updated once per award year.

use serde::{Deserialize, Serialize};

/// Award year whose figures the clients report
pub const CURRENT_AWARD_YEAR: &str = "2024-2025";

/// Fixed-rate federal Direct Loan interest rates, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederalLoanRates {
    pub undergraduate_subsidized: f64,
    pub undergraduate_unsubsidized: f64,
    pub graduate_unsubsidized: f64,
    pub plus: f64,
}

/// HHS poverty guideline for the 48 contiguous states, in dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PovertyGuideline {
    /// Guideline calendar year
    pub year: i32,
    /// Guideline for a household of one
    pub first_person: f64,
    /// Added for each additional household member
    pub per_additional_person: f64,
}

impl PovertyGuideline {
    /// Guideline for a household of `size` people (a size of 0 counts as 1)
    pub fn for_household(&self, size: u32) -> f64 {
        let extra = size.saturating_sub(1) as f64;
        self.first_person + extra * self.per_additional_person
    }
}

/// Pell Grant award band, in dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PellGrantBand {
    pub maximum_award: f64,
    pub minimum_award: f64,
}

/// All statutory figures for one award year
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyYear {
    /// Award year label, e.g. "2024-2025"
    pub award_year: &'static str,
    pub loan_rates: FederalLoanRates,
    pub poverty_guideline: PovertyGuideline,
    pub pell_grant: PellGrantBand,
}

/// Known award years, oldest first
pub static POLICY_YEARS: [PolicyYear; 2] = [
    PolicyYear {
        award_year: "2023-2024",
        loan_rates: FederalLoanRates {
            undergraduate_subsidized: 5.50,
            undergraduate_unsubsidized: 5.50,
            graduate_unsubsidized: 7.05,
            plus: 8.05,
        },
        poverty_guideline: PovertyGuideline {
            year: 2023,
            first_person: 14_580.0,
            per_additional_person: 5_140.0,
        },
        pell_grant: PellGrantBand {
            maximum_award: 7_395.0,
            minimum_award: 750.0,
        },
    },
    PolicyYear {
        award_year: "2024-2025",
        loan_rates: FederalLoanRates {
            undergraduate_subsidized: 6.53,
            undergraduate_unsubsidized: 6.53,
            graduate_unsubsidized: 8.08,
            plus: 9.08,
        },
        poverty_guideline: PovertyGuideline {
            year: 2024,
            first_person: 15_060.0,
            per_additional_person: 5_380.0,
        },
        pell_grant: PellGrantBand {
            maximum_award: 7_395.0,
            minimum_award: 740.0,
        },
    },
];

/// Looks up the figures for an award year such as "2024-2025"
pub fn policy_for(award_year: &str) -> Option<&'static PolicyYear> {
    POLICY_YEARS.iter().find(|p| p.award_year == award_year)
}

/// Figures for [`CURRENT_AWARD_YEAR`]
pub fn current_policy() -> &'static PolicyYear {
    policy_for(CURRENT_AWARD_YEAR).unwrap_or(&POLICY_YEARS[POLICY_YEARS.len() - 1])
}
