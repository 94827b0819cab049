//! Aggregation orchestration: drive every collector once, absorb failures,
//! merge, derive, stamp metadata.
//!
//! Collection is sequential in registration order: one collector finishes
//! (or fails) before the next starts, progress fractions only grow, and
//! upstream sites see at most one in-flight request per run. Merge outcomes
//! never depend on completion order; the priority list in [`crate::merge`]
//! governs.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::collector::{SourceCollector, SourceError, SourceResults};
use crate::collectors::{
    CrunchbaseCollector, DirectwebCollector, LinkedinCollector, WebsearchCollector,
};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{derived, merge, CompanyName, CompanyRecord, RunMetadata, SourceId, UtcDateTime, ValidationError};

/// Observational progress callback: `(message, fraction in [0, 1])`.
///
/// Invoked after each collector completes. Never affects control flow; the
/// aggregator works identically with no callback installed.
pub type ProgressFn = dyn Fn(&str, f64) + Send + Sync;

const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_secs(45);

/// Multi-source aggregation driver.
pub struct Aggregator {
    collectors: Vec<Arc<dyn SourceCollector>>,
    collector_timeout: Duration,
    cancel: CancellationToken,
}

impl Default for Aggregator {
    fn default() -> Self {
        AggregatorBuilder::new().build()
    }
}

impl Aggregator {
    pub fn new(collectors: Vec<Arc<dyn SourceCollector>>) -> Self {
        Self {
            collectors,
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Token the caller can use to abandon an in-flight aggregation. A
    /// cancelled run stops starting new collectors; outcomes already
    /// gathered still merge.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Sources in registration (= merge priority) order.
    pub fn registered_sources(&self) -> Vec<SourceId> {
        self.collectors.iter().map(|c| c.id()).collect()
    }

    /// Aggregate everything the registered sources know about a company.
    ///
    /// The only hard failure is an invalid company name, raised before any
    /// collector runs. Every per-source failure is absorbed into the run's
    /// outcomes; the call succeeds even when every source failed, returning
    /// a record holding just the name and run metadata.
    pub async fn comprehensive_profile(
        &self,
        company_name: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<CompanyRecord, ValidationError> {
        let (record, _) = self.profile_with_outcomes(company_name, progress).await?;
        Ok(record)
    }

    /// Like [`comprehensive_profile`](Self::comprehensive_profile), but also
    /// hands back the per-source outcomes so callers can surface failure
    /// reasons alongside the merged record.
    pub async fn profile_with_outcomes(
        &self,
        company_name: &str,
        progress: Option<&ProgressFn>,
    ) -> Result<(CompanyRecord, SourceResults), ValidationError> {
        let company = CompanyName::parse(company_name)?;
        let total = self.collectors.len();

        tracing::info!(company = company.as_str(), sources = total, "starting aggregation");

        let mut results = SourceResults::new();
        for (index, collector) in self.collectors.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    company = company.as_str(),
                    remaining = total - index,
                    "aggregation cancelled; skipping remaining sources"
                );
                break;
            }

            let source = collector.id();
            tracing::info!(source = source.as_str(), "collecting");

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => Err(SourceError::unavailable(
                    "collection abandoned by cancellation",
                )),
                timed = tokio::time::timeout(self.collector_timeout, collector.collect(&company)) => {
                    match timed {
                        Ok(outcome) => outcome,
                        Err(_) => Err(SourceError::timeout(format!(
                            "source '{source}' exceeded its {}ms budget",
                            self.collector_timeout.as_millis()
                        ))),
                    }
                }
            };

            match &outcome {
                Ok(partial) => tracing::info!(
                    source = source.as_str(),
                    fields = partial.field_count(),
                    "source succeeded"
                ),
                Err(error) => tracing::warn!(
                    source = source.as_str(),
                    error = %error,
                    "source failed"
                ),
            }
            results.insert(source, outcome);

            if let Some(report) = progress {
                report(
                    &format!("Collected {}", source.label()),
                    (index + 1) as f64 / total as f64,
                );
            }
        }

        let mut record = merge::merge(&results, &company);

        let now = UtcDateTime::now();
        derived::augment(&mut record, now.year());
        record.metadata = RunMetadata::new(
            results.successful_count(),
            total as u32,
            results.run_order(),
            now,
        )
        .expect("successful outcomes cannot exceed registered sources");

        tracing::info!(
            company = company.as_str(),
            successful = record.metadata.successful_sources,
            total = record.metadata.total_sources,
            "aggregation completed"
        );

        Ok((record, results))
    }
}

/// Builder wiring collectors to transports.
///
/// Mock mode (the default) gives every collector an offline no-op transport
/// with deterministic data. Real mode gives each enabled collector its own
/// reqwest client; transports are never shared between collectors.
#[derive(Debug)]
pub struct AggregatorBuilder {
    use_real_clients: bool,
    enable_crunchbase: bool,
    enable_linkedin: bool,
    enable_websearch: bool,
    enable_directweb: bool,
    collector_timeout: Duration,
    cancellation: Option<CancellationToken>,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatorBuilder {
    pub fn new() -> Self {
        Self {
            use_real_clients: false,
            enable_crunchbase: true,
            enable_linkedin: true,
            enable_websearch: true,
            enable_directweb: true,
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            cancellation: None,
        }
    }

    /// All collectors use offline transports with deterministic data.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_real_clients = false;
        self
    }

    /// Each enabled collector gets its own live HTTP client.
    ///
    /// Honors `FIRMSCOPE_TIMEOUT_MS` as a per-collector budget override.
    pub fn with_real_clients(mut self) -> Self {
        self.use_real_clients = true;
        if let Some(timeout_ms) = env::var("FIRMSCOPE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            self.collector_timeout = Duration::from_millis(timeout_ms);
        }
        self
    }

    pub fn with_source_enabled(mut self, source: SourceId, enabled: bool) -> Self {
        match source {
            SourceId::Crunchbase => self.enable_crunchbase = enabled,
            SourceId::Linkedin => self.enable_linkedin = enabled,
            SourceId::Websearch => self.enable_websearch = enabled,
            SourceId::Directweb => self.enable_directweb = enabled,
        }
        self
    }

    /// Restrict the run to a single source.
    pub fn with_only_source(mut self, source: SourceId) -> Self {
        for candidate in SourceId::ALL {
            self = self.with_source_enabled(candidate, candidate == source);
        }
        self
    }

    pub fn with_collector_timeout(mut self, timeout: Duration) -> Self {
        self.collector_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build around caller-supplied collectors (tests, custom sources),
    /// keeping the configured timeout and cancellation wiring.
    pub fn build_with_collectors(self, collectors: Vec<Arc<dyn SourceCollector>>) -> Aggregator {
        let mut aggregator = Aggregator::new(collectors);
        aggregator.collector_timeout = self.collector_timeout;
        if let Some(token) = self.cancellation {
            aggregator.cancel = token;
        }
        aggregator
    }

    pub fn build(self) -> Aggregator {
        let mut collectors: Vec<Arc<dyn SourceCollector>> = Vec::new();

        // Registration order is the merge priority order.
        if self.enable_crunchbase {
            collectors.push(if self.use_real_clients {
                Arc::new(CrunchbaseCollector::with_http_client(new_transport()))
            } else {
                Arc::new(CrunchbaseCollector::default())
            });
        }
        if self.enable_linkedin {
            collectors.push(if self.use_real_clients {
                Arc::new(LinkedinCollector::with_http_client(new_transport()))
            } else {
                Arc::new(LinkedinCollector::default())
            });
        }
        if self.enable_websearch {
            collectors.push(if self.use_real_clients {
                Arc::new(WebsearchCollector::with_http_client(new_transport()))
            } else {
                Arc::new(WebsearchCollector::default())
            });
        }
        if self.enable_directweb {
            collectors.push(if self.use_real_clients {
                Arc::new(DirectwebCollector::with_http_client(new_transport()))
            } else {
                Arc::new(DirectwebCollector::default())
            });
        }

        let mut aggregator = Aggregator::new(collectors);
        aggregator.collector_timeout = self.collector_timeout;
        if let Some(token) = self.cancellation {
            aggregator.cancel = token;
        }
        aggregator
    }
}

fn new_transport() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestHttpClient::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[tokio::test]
    async fn default_aggregator_registers_sources_in_priority_order() {
        let aggregator = Aggregator::default();
        assert_eq!(
            aggregator.registered_sources(),
            vec![
                SourceId::Crunchbase,
                SourceId::Linkedin,
                SourceId::Websearch,
                SourceId::Directweb,
            ]
        );
    }

    #[tokio::test]
    async fn progress_fractions_are_monotonic_and_end_at_one() {
        let aggregator = Aggregator::default();
        let fractions = Arc::new(Mutex::new(Vec::new()));

        let fractions_cb = Arc::clone(&fractions);
        let callback = move |_message: &str, fraction: f64| {
            fractions_cb.lock().expect("no poisoned lock").push(fraction);
        };

        aggregator
            .comprehensive_profile("Acme", Some(&callback))
            .await
            .expect("mock aggregation succeeds");

        drop(callback);
        let observed = Arc::try_unwrap(fractions)
            .expect("sole reference remains")
            .into_inner()
            .expect("no poisoned lock");
        assert_eq!(observed.len(), 4);
        assert!(observed.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(observed.last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn empty_company_name_fails_before_any_collector_runs() {
        struct CountingCollector {
            calls: AtomicUsize,
        }

        impl SourceCollector for CountingCollector {
            fn id(&self) -> SourceId {
                SourceId::Directweb
            }

            fn collect<'a>(
                &'a self,
                _company: &'a CompanyName,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = crate::collector::SourceOutcome> + Send + 'a>,
            > {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(crate::PartialRecord::default()) })
            }
        }

        let spy = Arc::new(CountingCollector {
            calls: AtomicUsize::new(0),
        });
        let aggregator = Aggregator::new(vec![spy.clone()]);

        let err = aggregator
            .comprehensive_profile("   ", None)
            .await
            .expect_err("blank name must fail");
        assert_eq!(err, ValidationError::EmptyCompanyName);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_run_skips_all_collectors_but_still_returns_a_record() {
        let token = CancellationToken::new();
        token.cancel();

        let aggregator = AggregatorBuilder::new()
            .with_cancellation(token)
            .build();

        let record = aggregator
            .comprehensive_profile("Acme", None)
            .await
            .expect("cancelled run still returns a record");

        assert!(record.is_bare());
        assert_eq!(record.metadata.successful_sources, 0);
        assert_eq!(record.metadata.total_sources, 4);
        assert!(record.metadata.scraped_sources.is_empty());
    }
}
