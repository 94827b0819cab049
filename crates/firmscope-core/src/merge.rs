//! Deterministic, priority-ordered reconciliation of per-source records.
//!
//! Reconciliation never depends on the input collection's insertion order:
//! every policy below walks [`SOURCE_PRIORITY`], so a parallel rewrite of
//! collection cannot change merge outcomes. An errored or absent source
//! contributes nothing to any field.
//!
//! Per-field policy:
//!
//! | Fields | Policy |
//! |--------|--------|
//! | funding_raised, valuation, revenue, market_cap, employees | maximum of positive reported values |
//! | ceo, founded_year, website, location, industry | first valid value in priority order |
//! | description | longest non-empty value, priority-independent |
//! | founders, investors | set union, blanks dropped |
//! | funding_rounds | union deduplicated by (amount, type) |
//!
//! The maximum policy can overstate a figure when one source over-extracts
//! (a competitor's round quoted in the same snippet); undercounting from
//! noisy extraction is the more common failure, so the most complete figure
//! wins.

use std::collections::BTreeSet;

use crate::{CompanyName, CompanyRecord, PartialRecord, SourceId, SourceResults};

/// Fixed source priority, highest first: the specialized funding database
/// outranks the professional network, which outranks general search, which
/// outranks the direct-site fallback.
pub const SOURCE_PRIORITY: [SourceId; 4] = [
    SourceId::Crunchbase,
    SourceId::Linkedin,
    SourceId::Websearch,
    SourceId::Directweb,
];

/// Merge all successful outcomes into one record.
///
/// The output's `name` is the query name verbatim, regardless of what any
/// source reported. Metadata is left for the aggregator to stamp. Merging
/// is idempotent: the same results merge to the same record every time.
pub fn merge(results: &SourceResults, company: &CompanyName) -> CompanyRecord {
    let partials: Vec<&PartialRecord> = SOURCE_PRIORITY
        .iter()
        .filter_map(|source| results.get(*source))
        .filter_map(|outcome| outcome.as_ref().ok())
        .collect();

    let mut record = CompanyRecord::empty(company);

    record.funding_raised = max_positive(&partials, |p| p.funding_raised);
    record.valuation = max_positive(&partials, |p| p.valuation);
    record.revenue = max_positive(&partials, |p| p.revenue);
    record.market_cap = max_positive(&partials, |p| p.market_cap);
    record.employees = partials
        .iter()
        .filter_map(|p| p.employees)
        .filter(|count| *count > 0)
        .max();

    record.ceo = first_valid(&partials, |p| p.ceo.as_deref(), |_| true);
    record.founded_year = partials
        .iter()
        .filter_map(|p| p.founded_year)
        .find(|year| *year > 1900);
    record.website = first_valid(&partials, |p| p.website.as_deref(), |url| {
        url.starts_with("http")
    });
    record.location = first_valid(&partials, |p| p.location.as_deref(), |_| true);
    record.industry = first_valid(&partials, |p| p.industry.as_deref(), |_| true);

    record.description = longest_description(&partials);

    record.founders = union_names(&partials, |p| &p.founders);
    record.investors = union_names(&partials, |p| &p.investors);
    record.funding_rounds = dedupe_rounds(&partials);

    record
}

/// Maximum across sources that reported a positive value; absent when no
/// source did.
fn max_positive(
    partials: &[&PartialRecord],
    field: impl Fn(&PartialRecord) -> Option<f64>,
) -> Option<f64> {
    partials
        .iter()
        .copied()
        .filter_map(field)
        .filter(|value| *value > 0.0)
        .fold(None, |best, value| {
            Some(best.map_or(value, |current: f64| current.max(value)))
        })
}

/// First value in priority order that is non-blank and passes the field's
/// validity predicate.
fn first_valid(
    partials: &[&PartialRecord],
    field: impl Fn(&PartialRecord) -> Option<&str>,
    valid: impl Fn(&str) -> bool,
) -> Option<String> {
    partials
        .iter()
        .copied()
        .filter_map(field)
        .map(str::trim)
        .find(|value| !value.is_empty() && valid(value))
        .map(str::to_owned)
}

/// Longest non-empty description across all sources. More detail is assumed
/// more useful, so priority does not apply here.
fn longest_description(partials: &[&PartialRecord]) -> Option<String> {
    partials
        .iter()
        .filter_map(|partial| partial.description.as_deref())
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .max_by_key(|description| description.chars().count())
        .map(str::to_owned)
}

fn union_names(
    partials: &[&PartialRecord],
    field: impl Fn(&PartialRecord) -> &BTreeSet<String>,
) -> BTreeSet<String> {
    partials
        .iter()
        .copied()
        .flat_map(|partial| field(partial).iter())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn dedupe_rounds(partials: &[&PartialRecord]) -> Vec<crate::FundingRound> {
    let mut seen = BTreeSet::new();
    let mut rounds = Vec::new();

    for partial in partials {
        for round in &partial.funding_rounds {
            if !round.is_informative() {
                continue;
            }
            if seen.insert(round.dedup_key()) {
                rounds.push(round.clone());
            }
        }
    }

    rounds
}
