//! Secondary metrics computed from a merged record.
//!
//! Derived fields are recomputed fresh on every run and are never inputs to
//! the merge engine: a source claiming a "funding stage" has no field to
//! put it in.

use serde::{Deserialize, Serialize};

use crate::CompanyRecord;

/// Funding stage bucketed from total funding raised.
///
/// Boundaries are inclusive-low/exclusive-high: exactly 5,000,000 is
/// Series A, not Seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStage {
    #[serde(rename = "Pre-Seed")]
    PreSeed,
    #[serde(rename = "Seed")]
    Seed,
    #[serde(rename = "Series A")]
    SeriesA,
    #[serde(rename = "Series B")]
    SeriesB,
    #[serde(rename = "Series C+")]
    SeriesCPlus,
    #[serde(rename = "Late Stage")]
    LateStage,
}

impl FundingStage {
    pub fn from_amount(raised: f64) -> Self {
        if raised < 1_000_000.0 {
            Self::PreSeed
        } else if raised < 5_000_000.0 {
            Self::Seed
        } else if raised < 20_000_000.0 {
            Self::SeriesA
        } else if raised < 50_000_000.0 {
            Self::SeriesB
        } else if raised < 100_000_000.0 {
            Self::SeriesCPlus
        } else {
            Self::LateStage
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreSeed => "Pre-Seed",
            Self::Seed => "Seed",
            Self::SeriesA => "Series A",
            Self::SeriesB => "Series B",
            Self::SeriesCPlus => "Series C+",
            Self::LateStage => "Late Stage",
        }
    }
}

/// Company size bucketed from headcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeSize {
    #[serde(rename = "Startup (1-9)")]
    Startup,
    #[serde(rename = "Small (10-49)")]
    Small,
    #[serde(rename = "Medium (50-199)")]
    Medium,
    #[serde(rename = "Large (200-999)")]
    Large,
    #[serde(rename = "Enterprise (1000+)")]
    Enterprise,
}

impl EmployeeSize {
    pub const fn from_headcount(employees: u32) -> Self {
        if employees < 10 {
            Self::Startup
        } else if employees < 50 {
            Self::Small
        } else if employees < 200 {
            Self::Medium
        } else if employees < 1_000 {
            Self::Large
        } else {
            Self::Enterprise
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "Startup (1-9)",
            Self::Small => "Small (10-49)",
            Self::Medium => "Medium (50-199)",
            Self::Large => "Large (200-999)",
            Self::Enterprise => "Enterprise (1000+)",
        }
    }
}

/// Compute derived metrics in place, once, after merge.
pub fn augment(record: &mut CompanyRecord, current_year: i32) {
    record.company_age = record
        .founded_year
        .map(|year| current_year.saturating_sub(year).max(0) as u32);
    record.funding_stage = record.funding_raised.map(FundingStage::from_amount);
    record.employee_size = record.employees.map(EmployeeSize::from_headcount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompanyName;

    #[test]
    fn stage_boundaries_are_inclusive_low_exclusive_high() {
        assert_eq!(FundingStage::from_amount(999_999.0), FundingStage::PreSeed);
        assert_eq!(FundingStage::from_amount(1_000_000.0), FundingStage::Seed);
        assert_eq!(FundingStage::from_amount(5_000_000.0), FundingStage::SeriesA);
        assert_eq!(FundingStage::from_amount(6_000_000.0), FundingStage::SeriesA);
        assert_eq!(FundingStage::from_amount(20_000_000.0), FundingStage::SeriesB);
        assert_eq!(FundingStage::from_amount(50_000_000.0), FundingStage::SeriesCPlus);
        assert_eq!(FundingStage::from_amount(100_000_000.0), FundingStage::LateStage);
    }

    #[test]
    fn employee_buckets_match_headcount_windows() {
        assert_eq!(EmployeeSize::from_headcount(9), EmployeeSize::Startup);
        assert_eq!(EmployeeSize::from_headcount(10), EmployeeSize::Small);
        assert_eq!(EmployeeSize::from_headcount(40), EmployeeSize::Small);
        assert_eq!(EmployeeSize::from_headcount(199), EmployeeSize::Medium);
        assert_eq!(EmployeeSize::from_headcount(999), EmployeeSize::Large);
        assert_eq!(EmployeeSize::from_headcount(1_000), EmployeeSize::Enterprise);
    }

    #[test]
    fn stage_serializes_to_display_label() {
        let value = serde_json::to_value(FundingStage::SeriesCPlus).expect("serializes");
        assert_eq!(value, serde_json::json!("Series C+"));
    }

    #[test]
    fn age_tracks_founded_year_and_never_appears_without_it() {
        let name = CompanyName::parse("Acme").expect("valid");
        let mut record = CompanyRecord::empty(&name);
        record.founded_year = Some(2015);

        augment(&mut record, 2026);
        assert_eq!(record.company_age, Some(11));

        record.founded_year = None;
        augment(&mut record, 2026);
        assert_eq!(record.company_age, None);
    }

    #[test]
    fn derived_fields_absent_when_inputs_absent() {
        let name = CompanyName::parse("Acme").expect("valid");
        let mut record = CompanyRecord::empty(&name);

        augment(&mut record, 2026);
        assert_eq!(record.funding_stage, None);
        assert_eq!(record.employee_size, None);
    }
}
