//! Source collector contract and per-run outcome bookkeeping.
//!
//! A collector gathers company data from exactly one external source. Its
//! failure is data, not control flow: the aggregator records an error
//! outcome and moves on, so "company not found on this source" and "source
//! unreachable" travel the same path with different reasons.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CompanyName, PartialRecord, SourceId};

/// Collector-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The source answered but has no matching entity. Never retried.
    NotFound,
    /// The source could not be reached or parsed.
    Unavailable,
    /// The source refused traffic for rate reasons.
    RateLimited,
    /// The collector exceeded its time budget.
    Timeout,
    /// The query was rejected before any network activity.
    InvalidQuery,
    Internal,
}

/// Structured per-source failure captured in a run's outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidQuery,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidQuery => "source.invalid_query",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// The success-or-error outcome of one collector run.
pub type SourceOutcome = Result<PartialRecord, SourceError>;

/// Source collector contract.
///
/// Implementations must be `Send + Sync`. A collector owns its network
/// session exclusively; nothing is shared between collector instances, so a
/// concurrent rewrite of the aggregator cannot corrupt sibling state.
pub trait SourceCollector: Send + Sync {
    /// The source this collector gathers from.
    fn id(&self) -> SourceId;

    /// Gather a partial record for the company.
    ///
    /// Returns only the fields the source could determine; a field the
    /// source cannot see is absent, never a placeholder. All failures are
    /// reported as [`SourceError`] values, never panics.
    fn collect<'a>(
        &'a self,
        company: &'a CompanyName,
    ) -> Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>>;
}

/// Outcomes of one aggregation run, keyed by source.
///
/// Keeps run order for `scraped_sources` metadata, but merge never consults
/// that order: reconciliation walks the static priority list.
#[derive(Debug, Default)]
pub struct SourceResults {
    entries: Vec<(SourceId, SourceOutcome)>,
}

impl SourceResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source's outcome. A second insert for the same source
    /// replaces the first; each collector runs at most once per call.
    pub fn insert(&mut self, source: SourceId, outcome: SourceOutcome) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| *existing == source)
        {
            slot.1 = outcome;
        } else {
            self.entries.push((source, outcome));
        }
    }

    pub fn get(&self, source: SourceId) -> Option<&SourceOutcome> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == source)
            .map(|(_, outcome)| outcome)
    }

    pub fn successful_count(&self) -> u32 {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_ok())
            .count() as u32
    }

    /// Sources in the order they were attempted.
    pub fn run_order(&self) -> Vec<SourceId> {
        self.entries.iter().map(|(source, _)| *source).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (SourceId, &SourceError)> {
        self.entries
            .iter()
            .filter_map(|(source, outcome)| Some((*source, outcome.as_ref().err()?)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
