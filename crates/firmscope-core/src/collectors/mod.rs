//! Source collector implementations, one per external data source.
//!
//! | Collector | Source | Specialty |
//! |-----------|--------|-----------|
//! | [`CrunchbaseCollector`] | funding database | funding totals, rounds, investors |
//! | [`LinkedinCollector`] | professional network | headcount, industry, location |
//! | [`WebsearchCollector`] | general web search | leadership, financials |
//! | [`DirectwebCollector`] | direct-site fallback | profile basics |
//!
//! Every collector defaults to an offline mock session with deterministic,
//! company-seeded data; `with_http_client` switches it to live collection.

mod crunchbase;
mod directweb;
mod fake;
mod linkedin;
mod session;
mod websearch;

pub use crunchbase::CrunchbaseCollector;
pub use directweb::DirectwebCollector;
pub use linkedin::LinkedinCollector;
pub use websearch::WebsearchCollector;
