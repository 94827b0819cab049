use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::derived::{EmployeeSize, FundingStage};
use crate::{SourceId, UtcDateTime, ValidationError};

/// Validated company query key.
///
/// Surrounding whitespace is trimmed; interior text is arbitrary user input
/// and is carried verbatim into the merged record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyName(String);

impl CompanyName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCompanyName);
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CompanyName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CompanyName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CompanyName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CompanyName> for String {
    fn from(value: CompanyName) -> Self {
        value.0
    }
}

/// One financing event reported by a source.
///
/// Rounds are deduplicated by the `(amount, type)` pair during merge; a round
/// carrying neither is uninformative and gets dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub round_type: Option<String>,
}

impl FundingRound {
    pub fn new(
        date: Option<UtcDateTime>,
        amount: Option<f64>,
        round_type: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if let Some(amount) = amount {
            if !amount.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "amount" });
            }
            if amount < 0.0 {
                return Err(ValidationError::NegativeValue { field: "amount" });
            }
        }

        let round_type = round_type
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned);

        Ok(Self {
            date,
            amount,
            round_type,
        })
    }

    pub fn is_informative(&self) -> bool {
        self.amount.is_some() || self.round_type.is_some()
    }

    /// Key used for round deduplication. Amount participates bitwise so two
    /// textually-equal extractions compare equal; round labels compare
    /// case-insensitively.
    pub(crate) fn dedup_key(&self) -> (Option<u64>, Option<String>) {
        (
            self.amount.map(f64::to_bits),
            self.round_type
                .as_deref()
                .map(|label| label.to_ascii_lowercase()),
        )
    }
}

/// Per-run bookkeeping attached to every merged record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub successful_sources: u32,
    pub total_sources: u32,
    pub scraped_sources: Vec<SourceId>,
    pub timestamp: UtcDateTime,
}

impl RunMetadata {
    pub fn new(
        successful_sources: u32,
        total_sources: u32,
        scraped_sources: Vec<SourceId>,
        timestamp: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if successful_sources > total_sources {
            return Err(ValidationError::SourceCountExceedsTotal {
                successful: successful_sources,
                total: total_sources,
            });
        }

        Ok(Self {
            successful_sources,
            total_sources,
            scraped_sources,
            timestamp,
        })
    }

    pub fn coverage(&self) -> Coverage {
        if self.successful_sources == 0 {
            Coverage::Empty
        } else if self.successful_sources < self.total_sources {
            Coverage::Partial
        } else {
            Coverage::Complete
        }
    }
}

/// How much of the registered source set produced data for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Empty,
    Partial,
    Complete,
}

/// The merged, typed representation of everything known about a company
/// after one aggregation run.
///
/// Serializes to plain JSON (absent fields omitted) so the record can cross
/// a process or UI boundary without further transformation. Records carry no
/// identity across runs; a later run for the same name produces an
/// independent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_raised: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceo: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub founders: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub investors: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub funding_rounds: Vec<FundingRound>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<FundingStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_size: Option<EmployeeSize>,

    pub metadata: RunMetadata,
}

impl CompanyRecord {
    /// Empty record for one aggregation run; populated exclusively by the
    /// merge engine and augmented once by the derived-metrics pass.
    pub fn empty(name: &CompanyName) -> Self {
        Self {
            name: name.as_str().to_owned(),
            funding_raised: None,
            valuation: None,
            revenue: None,
            market_cap: None,
            employees: None,
            founded_year: None,
            ceo: None,
            founders: BTreeSet::new(),
            investors: BTreeSet::new(),
            funding_rounds: Vec::new(),
            description: None,
            website: None,
            location: None,
            industry: None,
            company_age: None,
            funding_stage: None,
            employee_size: None,
            metadata: RunMetadata {
                successful_sources: 0,
                total_sources: 0,
                scraped_sources: Vec::new(),
                timestamp: UtcDateTime::now(),
            },
        }
    }

    /// True when no source contributed any field: only the query name and
    /// run metadata are present.
    pub fn is_bare(&self) -> bool {
        self.funding_raised.is_none()
            && self.valuation.is_none()
            && self.revenue.is_none()
            && self.market_cap.is_none()
            && self.employees.is_none()
            && self.founded_year.is_none()
            && self.ceo.is_none()
            && self.founders.is_empty()
            && self.investors.is_empty()
            && self.funding_rounds.is_empty()
            && self.description.is_none()
            && self.website.is_none()
            && self.location.is_none()
            && self.industry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_company_name() {
        let parsed = CompanyName::parse("  Acme Corp  ").expect("name should parse");
        assert_eq!(parsed.as_str(), "Acme Corp");
    }

    #[test]
    fn rejects_whitespace_only_name() {
        let err = CompanyName::parse("   \t ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyCompanyName);
    }

    #[test]
    fn round_normalizes_blank_type_to_absent() {
        let round = FundingRound::new(None, Some(5_000_000.0), Some("  ")).expect("valid round");
        assert_eq!(round.round_type, None);
        assert!(round.is_informative());
    }

    #[test]
    fn round_rejects_negative_amount() {
        let err = FundingRound::new(None, Some(-1.0), Some("Seed")).expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn round_dedup_key_ignores_type_case() {
        let a = FundingRound::new(None, Some(5_000_000.0), Some("Seed")).expect("valid");
        let b = FundingRound::new(None, Some(5_000_000.0), Some("seed")).expect("valid");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn metadata_rejects_successful_above_total() {
        let err = RunMetadata::new(5, 4, Vec::new(), UtcDateTime::now()).expect_err("must fail");
        assert!(matches!(err, ValidationError::SourceCountExceedsTotal { .. }));
    }

    #[test]
    fn coverage_buckets_follow_source_counts() {
        let empty = RunMetadata::new(0, 4, Vec::new(), UtcDateTime::now()).expect("valid");
        let partial = RunMetadata::new(2, 4, Vec::new(), UtcDateTime::now()).expect("valid");
        let complete = RunMetadata::new(4, 4, Vec::new(), UtcDateTime::now()).expect("valid");

        assert_eq!(empty.coverage(), Coverage::Empty);
        assert_eq!(partial.coverage(), Coverage::Partial);
        assert_eq!(complete.coverage(), Coverage::Complete);
    }

    #[test]
    fn bare_record_serializes_to_name_and_metadata_only() {
        let name = CompanyName::parse("Acme").expect("valid name");
        let record = CompanyRecord::empty(&name);
        assert!(record.is_bare());

        let value = serde_json::to_value(&record).expect("serializes");
        let object = value.as_object().expect("record is a JSON object");
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("name"));
        assert!(object.contains_key("metadata"));
    }
}
