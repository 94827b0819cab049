use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{FundingRound, ValidationError};

/// The fields one source could determine for a company.
///
/// Every field is optional: absence means the source did not determine the
/// value, never a placeholder such as zero or an empty string. Collectors
/// build these from extracted text; the merge engine reconciles them into a
/// [`CompanyRecord`](crate::CompanyRecord).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
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
}

impl PartialRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Number of populated fields, used for logging and not-found decisions.
    pub fn field_count(&self) -> usize {
        let options = [
            self.funding_raised.is_some(),
            self.valuation.is_some(),
            self.revenue.is_some(),
            self.market_cap.is_some(),
            self.employees.is_some(),
            self.founded_year.is_some(),
            self.ceo.is_some(),
            self.description.is_some(),
            self.website.is_some(),
            self.location.is_some(),
            self.industry.is_some(),
        ];

        let mut count = options.iter().filter(|present| **present).count();
        if !self.founders.is_empty() {
            count += 1;
        }
        if !self.investors.is_empty() {
            count += 1;
        }
        if !self.funding_rounds.is_empty() {
            count += 1;
        }
        count
    }

    /// Fold another extraction pass into this record.
    ///
    /// Used by collectors that issue several queries against the same source:
    /// numeric fields keep the larger value, scalar fields keep the first
    /// non-empty value seen, sets union, and rounds append (cross-source
    /// deduplication happens later in the merge engine).
    pub fn absorb(&mut self, other: Self) {
        self.funding_raised = max_option(self.funding_raised, other.funding_raised);
        self.valuation = max_option(self.valuation, other.valuation);
        self.revenue = max_option(self.revenue, other.revenue);
        self.market_cap = max_option(self.market_cap, other.market_cap);
        self.employees = match (self.employees, other.employees) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        self.founded_year = self.founded_year.or(other.founded_year);
        self.ceo = self.ceo.take().or(other.ceo);
        self.description = self.description.take().or(other.description);
        self.website = self.website.take().or(other.website);
        self.location = self.location.take().or(other.location);
        self.industry = self.industry.take().or(other.industry);

        self.founders.extend(other.founders);
        self.investors.extend(other.investors);
        self.funding_rounds.extend(other.funding_rounds);
    }

    /// Check the data-model invariants for a record about to leave a
    /// collector: numeric fields non-negative and finite, no blank set
    /// entries, founded year in the plausible window.
    pub fn validate(&self, current_year: i32) -> Result<(), ValidationError> {
        validate_amount("funding_raised", self.funding_raised)?;
        validate_amount("valuation", self.valuation)?;
        validate_amount("revenue", self.revenue)?;
        validate_amount("market_cap", self.market_cap)?;

        if let Some(year) = self.founded_year {
            if year <= 1900 || year > current_year {
                return Err(ValidationError::FoundedYearOutOfRange {
                    year,
                    max: current_year,
                });
            }
        }

        for founder in &self.founders {
            if founder.trim().is_empty() {
                return Err(ValidationError::BlankEntry { field: "founders" });
            }
        }
        for investor in &self.investors {
            if investor.trim().is_empty() {
                return Err(ValidationError::BlankEntry { field: "investors" });
            }
        }

        Ok(())
    }
}

fn max_option(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn validate_amount(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_larger_numeric_and_first_scalar() {
        let mut base = PartialRecord {
            funding_raised: Some(2_000_000.0),
            ceo: Some(String::from("Jane Doe")),
            ..PartialRecord::default()
        };

        base.absorb(PartialRecord {
            funding_raised: Some(6_000_000.0),
            employees: Some(40),
            ceo: Some(String::from("Someone Else")),
            ..PartialRecord::default()
        });

        assert_eq!(base.funding_raised, Some(6_000_000.0));
        assert_eq!(base.employees, Some(40));
        assert_eq!(base.ceo.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn validate_rejects_negative_funding() {
        let record = PartialRecord {
            funding_raised: Some(-5.0),
            ..PartialRecord::default()
        };
        let err = record.validate(2026).expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn validate_rejects_future_founded_year() {
        let record = PartialRecord {
            founded_year: Some(2031),
            ..PartialRecord::default()
        };
        let err = record.validate(2026).expect_err("must fail");
        assert!(matches!(err, ValidationError::FoundedYearOutOfRange { .. }));
    }

    #[test]
    fn empty_record_counts_zero_fields() {
        let record = PartialRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.field_count(), 0);
    }
}
