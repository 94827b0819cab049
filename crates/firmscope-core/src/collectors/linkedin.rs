//! Professional-network collector.
//!
//! Locates the company's LinkedIn page through a search engine and reads
//! headcount and profile facts from it. Headcount is this source's
//! specialty; funding figures rarely appear here.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::collector::{SourceCollector, SourceError, SourceOutcome};
use crate::collectors::fake;
use crate::collectors::session::{search_url, WebSession};
use crate::extract::{FieldExtractor, FieldKind};
use crate::http_client::HttpClient;
use crate::{html, CompanyName, PartialRecord, SourceId};

const PAGE_HINTS: [FieldKind; 2] = [FieldKind::Headcount, FieldKind::Profile];
const LOCATION_SELECTORS: [&str; 3] = [".location", ".headquarters", "[data-test='location']"];
const INDUSTRY_SELECTORS: [&str; 2] = [".industry", "[data-test='industry']"];

pub struct LinkedinCollector {
    session: WebSession,
    extractor: FieldExtractor,
}

impl Default for LinkedinCollector {
    fn default() -> Self {
        Self {
            session: WebSession::mock(SourceId::Linkedin),
            extractor: FieldExtractor::new(),
        }
    }
}

impl LinkedinCollector {
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self {
            session: WebSession::real(SourceId::Linkedin, http),
            extractor: FieldExtractor::new(),
        }
    }

    async fn collect_live(&self, company: &CompanyName) -> SourceOutcome {
        let query = format!("linkedin {company} company");
        let results_page = self.session.fetch(&search_url(&query)).await?;

        let links = html::find_links(&results_page, "linkedin.com/company");
        let page_url = links.first().ok_or_else(|| {
            SourceError::not_found(format!("no LinkedIn company page found for '{company}'"))
        })?;

        tracing::debug!(url = page_url.as_str(), "following LinkedIn company link");
        self.session.courtesy_delay().await;
        let company_page = self.session.fetch(page_url).await?;

        let text = html::document_text(&company_page);
        let mut record = self.extractor.extract(&text, &PAGE_HINTS);

        if record.description.is_none() {
            record.description = html::meta_content(&company_page, "og:description");
        }
        if record.location.is_none() {
            record.location = html::select_all_text(&company_page, &LOCATION_SELECTORS)
                .into_iter()
                .next();
        }
        if record.industry.is_none() {
            record.industry = html::select_all_text(&company_page, &INDUSTRY_SELECTORS)
                .into_iter()
                .next();
        }

        record
            .validate(self.extractor.current_year())
            .map_err(|error| SourceError::internal(error.to_string()))?;

        if record.is_empty() {
            return Err(SourceError::not_found(
                "LinkedIn company page held no recognizable company facts",
            ));
        }

        Ok(record)
    }

    fn fake_record(&self, company: &CompanyName) -> PartialRecord {
        let seed = fake::company_seed(company);

        PartialRecord {
            employees: Some(8 + (seed % 1_400) as u32),
            founded_year: Some(2006 + (seed % 18) as i32),
            description: Some(format!(
                "{company} builds products for customers across several markets, with teams \
                 spanning engineering, sales, and operations. Profile sourced from the \
                 company's LinkedIn presence."
            )),
            industry: Some(fake::pick(&fake::INDUSTRIES, seed, 0).to_owned()),
            location: Some(fake::pick(&fake::CITIES, seed, 0).to_owned()),
            website: Some(format!("https://{}.example.com", fake::company_slug(company))),
            ..PartialRecord::default()
        }
    }
}

impl SourceCollector for LinkedinCollector {
    fn id(&self) -> SourceId {
        SourceId::Linkedin
    }

    fn collect<'a>(
        &'a self,
        company: &'a CompanyName,
    ) -> Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.session.is_mock() {
                let query = format!("linkedin {company} company");
                self.session.fetch(&search_url(&query)).await?;
                return Ok(self.fake_record(company));
            }

            self.collect_live(company).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_mode_reports_headcount_and_profile_fields() {
        let collector = LinkedinCollector::default();
        let company = CompanyName::parse("Acme").expect("valid");

        let record = collector.collect(&company).await.expect("mock collect succeeds");
        assert!(record.employees.is_some());
        assert!(record.industry.is_some());
        assert!(record.funding_raised.is_none());
    }
}
