//! Deterministic offline data for mock-mode collectors.
//!
//! Values are seeded from the company name so repeated runs (and the test
//! suites) see stable records, while different companies still produce
//! different profiles. Each source fabricates the field families its real
//! counterpart would find, which keeps the merge engine fully exercised in
//! offline mode.

use crate::CompanyName;

pub(crate) const PEOPLE: [&str; 8] = [
    "Jane Calloway",
    "Marcus Webb",
    "Priya Raman",
    "Tomas Lindqvist",
    "Aisha Bello",
    "Daniel Okafor",
    "Mei Tanaka",
    "Lucas Ferreira",
];

pub(crate) const INVESTORS: [&str; 8] = [
    "Sequoia Capital",
    "Accel Partners",
    "Index Ventures",
    "Benchmark",
    "Lightspeed Venture Partners",
    "Greylock Partners",
    "Bessemer Venture Partners",
    "First Round Capital",
];

pub(crate) const CITIES: [&str; 6] = [
    "San Francisco, California",
    "New York, New York",
    "Austin, Texas",
    "London, United Kingdom",
    "Berlin, Germany",
    "Singapore",
];

pub(crate) const INDUSTRIES: [&str; 6] = [
    "Software Development",
    "Financial Services",
    "Healthcare Technology",
    "Logistics & Supply Chain",
    "Consumer Internet",
    "Climate Technology",
];

/// Stable small hash of the company name.
pub(crate) fn company_seed(company: &CompanyName) -> u64 {
    company
        .as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

pub(crate) fn pick(catalog: &[&'static str], seed: u64, offset: u64) -> &'static str {
    catalog[((seed.wrapping_add(offset)) % catalog.len() as u64) as usize]
}

/// URL-safe slug of the company name for fabricated websites.
pub(crate) fn company_slug(company: &CompanyName) -> String {
    let slug: String = company
        .as_str()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    if slug.is_empty() {
        String::from("company")
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_per_name() {
        let acme = CompanyName::parse("Acme").expect("valid");
        assert_eq!(company_seed(&acme), company_seed(&acme));

        let other = CompanyName::parse("Globex").expect("valid");
        assert_ne!(company_seed(&acme), company_seed(&other));
    }

    #[test]
    fn slug_strips_non_alphanumerics() {
        let name = CompanyName::parse("Acme Widgets, Inc.").expect("valid");
        assert_eq!(company_slug(&name), "acmewidgetsinc");
    }
}
