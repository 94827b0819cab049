//! # Firmscope Core
//!
//! Multi-source company profiling: collect partial facts from several
//! unreliable web sources, reconcile them deterministically, and derive
//! secondary metrics.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Firmscope:
//!
//! - **Canonical domain models** for company records, partial per-source
//!   records, and funding rounds
//! - **Source collector trait** with one implementation per external source
//! - **Pure field extractor** turning raw text into typed candidate values
//! - **Merge engine** with a fixed source-priority reconciliation policy
//! - **Derived metrics** (company age, funding stage, employee size)
//! - **Aggregator** orchestrating the run with progress reporting,
//!   per-source timeouts, and cooperative cancellation
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Run orchestration and collector wiring |
//! | [`collector`] | Collector contract, source errors, run outcomes |
//! | [`collectors`] | Source collectors (Crunchbase, LinkedIn, web search, fallback) |
//! | [`derived`] | Derived-metric buckets and computation |
//! | [`domain`] | Domain models (CompanyName, CompanyRecord, PartialRecord) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`extract`] | Pure pattern-matching field extraction |
//! | [`html`] | HTML text/link/meta helpers for collectors |
//! | [`http_client`] | HTTP client abstraction (reqwest/none) |
//! | [`merge`] | Priority-ordered merge engine |
//! | [`pacing`] | Rate-considerate request pacing |
//! | [`retry`] | Bounded retry with exponential backoff |
//! | [`source`] | Source identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use firmscope_core::Aggregator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Offline aggregator with deterministic data
//!     let aggregator = Aggregator::default();
//!
//!     let record = aggregator
//!         .comprehensive_profile("Acme", Some(&|message, fraction| {
//!             eprintln!("[{:3.0}%] {message}", fraction * 100.0);
//!         }))
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Aggregator    │────▶│ Progress / Cancel│
//! └────────┬────────┘     └──────────────────┘
//!          │ one pass per source
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ SourceCollector │────▶│ Pacing + Retry   │
//! │ (4 impls)       │     │ HTTP Client      │
//! └────────┬────────┘     └──────────────────┘
//!          │ page text
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ FieldExtractor  │────▶│ Merge Engine     │
//! │ (pure patterns) │     │ Derived Metrics  │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Failure Model
//!
//! Only an invalid company name fails a run. Every per-source failure
//! (unreachable, not found, rate-limited, timed out) is captured as a
//! [`SourceError`] outcome and recorded in run metadata; the aggregation
//! returns a record even when every source failed.

pub mod aggregator;
pub mod collector;
pub mod collectors;
pub mod derived;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod html;
pub mod http_client;
pub mod merge;
pub mod pacing;
pub mod retry;
pub mod source;

// Re-export commonly used types at crate root for convenience

// Aggregation
pub use aggregator::{Aggregator, AggregatorBuilder, ProgressFn};

// Collector contract and outcomes
pub use collector::{SourceCollector, SourceError, SourceErrorKind, SourceOutcome, SourceResults};

// Collector implementations
pub use collectors::{
    CrunchbaseCollector, DirectwebCollector, LinkedinCollector, WebsearchCollector,
};

// Derived metrics
pub use derived::{augment, EmployeeSize, FundingStage};

// Domain models
pub use domain::{
    CompanyName, CompanyRecord, Coverage, FundingRound, PartialRecord, RunMetadata, UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{CoreError, ValidationError};

// Extraction
pub use extract::{parse_headcount, parse_money, FieldExtractor, FieldKind};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Merge policy
pub use merge::{merge as merge_sources, SOURCE_PRIORITY};

// Pacing
pub use pacing::{PacingGate, PacingPolicy};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::SourceId;
