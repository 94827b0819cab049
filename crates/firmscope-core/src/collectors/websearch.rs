//! General web-search collector.
//!
//! Issues several query variants against a search engine and extracts facts
//! from the result snippets, hinting the extractor with the field family
//! each query was about. Individual query failures are tolerated; the
//! collector fails only when every query fails or nothing was recognized.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::collector::{SourceCollector, SourceError, SourceOutcome};
use crate::collectors::fake;
use crate::collectors::session::{search_url, WebSession, SEARCH_SNIPPET_SELECTORS};
use crate::extract::{FieldExtractor, FieldKind};
use crate::http_client::HttpClient;
use crate::{html, CompanyName, PartialRecord, SourceId};

pub struct WebsearchCollector {
    session: WebSession,
    extractor: FieldExtractor,
}

impl Default for WebsearchCollector {
    fn default() -> Self {
        Self {
            session: WebSession::mock(SourceId::Websearch),
            extractor: FieldExtractor::new(),
        }
    }
}

impl WebsearchCollector {
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self {
            session: WebSession::real(SourceId::Websearch, http),
            extractor: FieldExtractor::new(),
        }
    }

    fn query_plan(company: &CompanyName) -> [(String, Vec<FieldKind>); 4] {
        [
            (
                format!("{company} funding raised investors"),
                vec![FieldKind::Funding],
            ),
            (
                format!("{company} CEO founder"),
                vec![FieldKind::Leadership],
            ),
            (
                format!("{company} revenue market cap valuation"),
                vec![FieldKind::Financials],
            ),
            (
                format!("{company} employees team size"),
                vec![FieldKind::Headcount, FieldKind::Profile],
            ),
        ]
    }

    async fn collect_live(&self, company: &CompanyName) -> SourceOutcome {
        let mut accumulated = PartialRecord::default();
        let mut last_error = None;
        let mut failed_queries = 0usize;

        let plan = Self::query_plan(company);
        for (index, (query, hints)) in plan.iter().enumerate() {
            if index > 0 {
                self.session.courtesy_delay().await;
            }

            let results_page = match self.session.fetch(&search_url(query)).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(query = query.as_str(), error = %error, "search query failed");
                    failed_queries += 1;
                    last_error = Some(error);
                    continue;
                }
            };

            let snippets = html::select_all_text(&results_page, &SEARCH_SNIPPET_SELECTORS);
            if snippets.is_empty() {
                continue;
            }

            let combined = snippets.join(" ");
            accumulated.absorb(self.extractor.extract(&combined, hints));
        }

        if failed_queries == plan.len() {
            return Err(last_error
                .unwrap_or_else(|| SourceError::unavailable("all search queries failed")));
        }

        accumulated
            .validate(self.extractor.current_year())
            .map_err(|error| SourceError::internal(error.to_string()))?;

        if accumulated.is_empty() {
            return Err(SourceError::not_found(
                "web search surfaced no recognizable company facts",
            ));
        }

        Ok(accumulated)
    }

    fn fake_record(&self, company: &CompanyName) -> PartialRecord {
        let seed = fake::company_seed(company);

        let mut record = PartialRecord {
            funding_raised: Some((1 + seed % 50) as f64 * 1_000_000.0),
            revenue: Some((1 + seed % 30) as f64 * 1_000_000.0),
            employees: Some(5 + (seed % 1_200) as u32),
            ceo: Some(fake::pick(&fake::PEOPLE, seed, 2).to_owned()),
            description: Some(format!(
                "News coverage describes {company} as a growing company attracting venture \
                 investment."
            )),
            ..PartialRecord::default()
        };

        record
            .founders
            .insert(fake::pick(&fake::PEOPLE, seed, 1).to_owned());
        record
            .founders
            .insert(fake::pick(&fake::PEOPLE, seed, 3).to_owned());
        record
            .investors
            .insert(fake::pick(&fake::INVESTORS, seed, 2).to_owned());

        record
    }
}

impl SourceCollector for WebsearchCollector {
    fn id(&self) -> SourceId {
        SourceId::Websearch
    }

    fn collect<'a>(
        &'a self,
        company: &'a CompanyName,
    ) -> Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.session.is_mock() {
                let query = format!("{company} funding raised investors");
                self.session.fetch(&search_url(&query)).await?;
                return Ok(self.fake_record(company));
            }

            self.collect_live(company).await
        })
    }
}
