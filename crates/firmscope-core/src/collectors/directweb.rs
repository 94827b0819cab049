//! Direct-site fallback collector.
//!
//! The least capable and most reliable source: one plain HTTP search with
//! no session choreography, extraction over whatever snippets come back.
//! Runs last in priority, so it only fills gaps the richer sources left.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::collector::{SourceCollector, SourceError, SourceOutcome};
use crate::collectors::fake;
use crate::collectors::session::{search_url, WebSession, SEARCH_SNIPPET_SELECTORS};
use crate::extract::FieldExtractor;
use crate::http_client::HttpClient;
use crate::{html, CompanyName, PartialRecord, SourceId};

pub struct DirectwebCollector {
    session: WebSession,
    extractor: FieldExtractor,
}

impl Default for DirectwebCollector {
    fn default() -> Self {
        Self {
            session: WebSession::mock(SourceId::Directweb),
            extractor: FieldExtractor::new(),
        }
    }
}

impl DirectwebCollector {
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self {
            session: WebSession::real(SourceId::Directweb, http),
            extractor: FieldExtractor::new(),
        }
    }

    fn query(company: &CompanyName) -> String {
        format!("{company} company information funding revenue employees founded")
    }

    async fn collect_live(&self, company: &CompanyName) -> SourceOutcome {
        let results_page = self.session.fetch(&search_url(&Self::query(company))).await?;

        let snippets = html::select_all_text(&results_page, &SEARCH_SNIPPET_SELECTORS);
        let text = if snippets.is_empty() {
            html::document_text(&results_page)
        } else {
            snippets.join(" ")
        };

        // Empty hint set: this single pass looks for everything.
        let record = self.extractor.extract(&text, &[]);

        record
            .validate(self.extractor.current_year())
            .map_err(|error| SourceError::internal(error.to_string()))?;

        if record.is_empty() {
            return Err(SourceError::not_found(
                "fallback search surfaced no recognizable company facts",
            ));
        }

        Ok(record)
    }

    fn fake_record(&self, company: &CompanyName) -> PartialRecord {
        let seed = fake::company_seed(company);

        PartialRecord {
            founded_year: Some(2006 + (seed % 18) as i32),
            description: Some(format!("{company} official website and public filings.")),
            website: Some(format!("https://{}.example.com", fake::company_slug(company))),
            ..PartialRecord::default()
        }
    }
}

impl SourceCollector for DirectwebCollector {
    fn id(&self) -> SourceId {
        SourceId::Directweb
    }

    fn collect<'a>(
        &'a self,
        company: &'a CompanyName,
    ) -> Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.session.is_mock() {
                self.session.fetch(&search_url(&Self::query(company))).await?;
                return Ok(self.fake_record(company));
            }

            self.collect_live(company).await
        })
    }
}
