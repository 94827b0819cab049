//! Funding-database collector.
//!
//! Finds the company's Crunchbase profile through a search engine (the
//! profile site's own search sits behind aggressive anti-bot defenses),
//! then extracts funding facts from the profile page text.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::collector::{SourceCollector, SourceError, SourceOutcome};
use crate::collectors::fake;
use crate::collectors::session::{search_url, WebSession};
use crate::extract::{FieldExtractor, FieldKind};
use crate::http_client::HttpClient;
use crate::{html, CompanyName, FundingRound, PartialRecord, SourceId};

const PROFILE_HINTS: [FieldKind; 3] = [FieldKind::Funding, FieldKind::Leadership, FieldKind::Profile];
const LOCATION_SELECTORS: [&str; 3] = [".location", ".headquarters", "[data-test='location']"];

pub struct CrunchbaseCollector {
    session: WebSession,
    extractor: FieldExtractor,
}

impl Default for CrunchbaseCollector {
    fn default() -> Self {
        Self {
            session: WebSession::mock(SourceId::Crunchbase),
            extractor: FieldExtractor::new(),
        }
    }
}

impl CrunchbaseCollector {
    pub fn with_http_client(http: Arc<dyn HttpClient>) -> Self {
        Self {
            session: WebSession::real(SourceId::Crunchbase, http),
            extractor: FieldExtractor::new(),
        }
    }

    async fn collect_live(&self, company: &CompanyName) -> SourceOutcome {
        let query = format!("crunchbase {company}");
        let results_page = self.session.fetch(&search_url(&query)).await?;

        let links = html::find_links(&results_page, "crunchbase.com");
        let profile_url = links
            .iter()
            .find(|link| link.contains("/organization/"))
            .or_else(|| links.first())
            .ok_or_else(|| {
                SourceError::not_found(format!("no Crunchbase profile found for '{company}'"))
            })?;

        tracing::debug!(url = profile_url.as_str(), "following Crunchbase profile link");
        self.session.courtesy_delay().await;
        let profile_page = self.session.fetch(profile_url).await?;

        let text = html::document_text(&profile_page);
        let mut record = self.extractor.extract(&text, &PROFILE_HINTS);

        if record.description.is_none() {
            record.description = html::meta_content(&profile_page, "og:description");
        }
        if record.location.is_none() {
            record.location = html::select_all_text(&profile_page, &LOCATION_SELECTORS)
                .into_iter()
                .next();
        }

        record
            .validate(self.extractor.current_year())
            .map_err(|error| SourceError::internal(error.to_string()))?;

        if record.is_empty() {
            return Err(SourceError::not_found(
                "Crunchbase profile held no recognizable company facts",
            ));
        }

        Ok(record)
    }

    fn fake_record(&self, company: &CompanyName) -> PartialRecord {
        let seed = fake::company_seed(company);
        let funding = (2 + seed % 58) as f64 * 1_000_000.0;

        let mut record = PartialRecord {
            funding_raised: Some(funding),
            valuation: Some(funding * 4.0),
            founded_year: Some(2006 + (seed % 18) as i32),
            description: Some(format!(
                "{company} is a venture-backed company tracked in the Crunchbase registry."
            )),
            location: Some(fake::pick(&fake::CITIES, seed, 0).to_owned()),
            website: Some(format!("https://{}.example.com", fake::company_slug(company))),
            ..PartialRecord::default()
        };

        record
            .founders
            .insert(fake::pick(&fake::PEOPLE, seed, 0).to_owned());
        record
            .founders
            .insert(fake::pick(&fake::PEOPLE, seed, 1).to_owned());
        record
            .investors
            .insert(fake::pick(&fake::INVESTORS, seed, 0).to_owned());
        record
            .investors
            .insert(fake::pick(&fake::INVESTORS, seed, 1).to_owned());

        if let Ok(round) = FundingRound::new(None, Some(1_500_000.0), Some("Seed")) {
            record.funding_rounds.push(round);
        }
        if funding >= 8_000_000.0 {
            if let Ok(round) = FundingRound::new(None, Some(funding * 0.6), Some("Series A")) {
                record.funding_rounds.push(round);
            }
        }

        record
    }
}

impl SourceCollector for CrunchbaseCollector {
    fn id(&self) -> SourceId {
        SourceId::Crunchbase
    }

    fn collect<'a>(
        &'a self,
        company: &'a CompanyName,
    ) -> Pin<Box<dyn Future<Output = SourceOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.session.is_mock() {
                let query = format!("crunchbase {company}");
                self.session.fetch(&search_url(&query)).await?;
                return Ok(self.fake_record(company));
            }

            self.collect_live(company).await
        })
    }
}
