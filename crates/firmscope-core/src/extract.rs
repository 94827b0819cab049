//! Pure pattern-matching extraction of typed company facts from raw text.
//!
//! The extractor never performs I/O and never fails: a pattern miss yields
//! field absence, not an error. Collectors pass page text or search-result
//! snippets together with hints describing what the originating query was
//! about, so unrelated patterns are not even attempted.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{FundingRound, PartialRecord, UtcDateTime};

/// Which family of facts a piece of text is expected to contain.
///
/// Derived from the query that produced the text. An empty hint set means
/// "extract everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Funding,
    Leadership,
    Financials,
    Headcount,
    Profile,
}

impl FieldKind {
    pub const ALL: [Self; 5] = [
        Self::Funding,
        Self::Leadership,
        Self::Financials,
        Self::Headcount,
        Self::Profile,
    ];
}

const AMOUNT: &str = r"\$\s*([0-9][\d,]*(?:\.\d+)?)\s*(thousand|million|billion|[kmb])\b";

// Name spans deliberately exclude '.' so a capture stops at a sentence
// boundary. The founder span admits ',' (name lists), the investor span
// admits '&' (firm names); mixing the two swallows whole clauses.
const PERSON_SPAN: &str = r"([A-Z][A-Za-z'\s-]+)";
const PERSON_LIST_SPAN: &str = r"([A-Z][A-Za-z'\s,-]+)";
const ORG_SPAN: &str = r"([A-Z][A-Za-z'&\s-]+)";

static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i){AMOUNT}")).expect("money pattern must compile"));

static FUNDING_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i)(?:raised|secured|funding\s+of|total\s+funding\s+(?:of\s+)?)\s*{AMOUNT}"),
        format!("(?i){AMOUNT}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("funding pattern must compile"))
    .collect()
});

static VALUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:valuation\s+of|valued\s+at)\s+{AMOUNT}"))
        .expect("valuation pattern must compile")
});

static REVENUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:annual\s+)?revenue\s+(?:of\s+)?{AMOUNT}"))
        .expect("revenue pattern must compile")
});

static MARKET_CAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)market\s+cap(?:italization)?\s+(?:of\s+)?{AMOUNT}"
    ))
    .expect("market-cap pattern must compile")
});

static ROUND_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(
            r"(?i){AMOUNT}\s+(pre-seed|seed|angel|series\s+[a-f])\s+(?:round|funding|financing)"
        ),
        format!(
            r"(?i)(pre-seed|seed|angel|series\s+[a-f])\s+(?:round|funding|financing)\s+of\s+{AMOUNT}"
        ),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("round pattern must compile"))
    .collect()
});

static EMPLOYEE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)([0-9][\d,]*)\s+employees?\b",
        r"(?i)team\s+of\s+([0-9][\d,]*)\b",
        r"(?i)([0-9][\d,]*)\s+people\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("employee pattern must compile"))
    .collect()
});

static FOUNDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:founded|established|started)\s+(?:in\s+)?((?:19|20)\d{2})\b")
        .expect("founded pattern must compile")
});

static BARE_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("year pattern must compile"));

static CEO_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?:CEO|[Cc]hief\s+[Ee]xecutive\s+[Oo]fficer)[,:\s]\s*{PERSON_SPAN}"),
        format!(r"{PERSON_SPAN},?\s+(?:is\s+(?:the\s+)?)?CEO\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("ceo pattern must compile"))
    .collect()
});

static FOUNDER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?:[Ff]ounded\s+by|[Cc]o-?[Ff]ounders?|[Ff]ounders?)[,:\s]\s*{PERSON_LIST_SPAN}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("founder pattern must compile"))
    .collect()
});

static INVESTOR_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(
            r"(?:[Ll]ed\s+by|[Ii]nvestors?\s+includ(?:e|ed|ing)|[Bb]acked\s+by|[Ii]nvestment\s+from)\s+{ORG_SPAN}"
        ),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("investor pattern must compile"))
    .collect()
});

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s"'<>()]+"#).expect("website pattern must compile")
});

/// Hosts that appear in scraped pages but are never a company's own site.
const NON_COMPANY_HOSTS: [&str; 4] = [
    "duckduckgo.com",
    "google.com",
    "crunchbase.com",
    "linkedin.com",
];

/// Pure, reentrant field extractor.
///
/// `current_year` bounds founded-year validation; production callers use the
/// current UTC year, tests pin it.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    current_year: i32,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            current_year: UtcDateTime::now().year(),
        }
    }

    pub const fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    pub const fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Extract whatever typed values the text yields for the hinted field
    /// families. Never fails; misses are absences.
    pub fn extract(&self, text: &str, hints: &[FieldKind]) -> PartialRecord {
        let mut record = PartialRecord::default();
        let wants = |kind: FieldKind| hints.is_empty() || hints.contains(&kind);

        if wants(FieldKind::Funding) {
            record.funding_raised = max_amount(&FUNDING_RES, text);
            record.valuation = first_amount(&VALUATION_RE, text);
            record.investors = extract_org_names(&INVESTOR_RES, text);
            record.funding_rounds = extract_rounds(text);
        }

        if wants(FieldKind::Leadership) {
            record.ceo = self.extract_ceo(text);
            record.founders = extract_person_names(&FOUNDER_RES, text);
        }

        if wants(FieldKind::Financials) {
            record.revenue = first_amount(&REVENUE_RE, text);
            record.market_cap = first_amount(&MARKET_CAP_RE, text);
            if record.valuation.is_none() {
                record.valuation = first_amount(&VALUATION_RE, text);
            }
        }

        if wants(FieldKind::Headcount) {
            record.employees = parse_headcount(text);
        }

        if wants(FieldKind::Profile) {
            record.founded_year = self.founded_year(text);
            record.website = self.extract_website(text);
        }

        record
    }

    /// First 4-digit year token in the plausible window, context-free.
    pub fn parse_year(&self, text: &str) -> Option<i32> {
        BARE_YEAR_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
            .find(|year| self.year_in_range(*year))
    }

    fn founded_year(&self, text: &str) -> Option<i32> {
        FOUNDED_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
            .find(|year| self.year_in_range(*year))
    }

    const fn year_in_range(&self, year: i32) -> bool {
        year > 1900 && year <= self.current_year
    }

    fn extract_ceo(&self, text: &str) -> Option<String> {
        CEO_RES
            .iter()
            .filter_map(|pattern| {
                let caps = pattern.captures(text)?;
                clean_person_name(caps.get(1)?.as_str())
            })
            .next()
    }

    fn extract_website(&self, text: &str) -> Option<String> {
        WEBSITE_RE
            .find_iter(text)
            .map(|found| found.as_str().trim_end_matches(['.', ',']).to_owned())
            .find(|url| !NON_COMPANY_HOSTS.iter().any(|host| url.contains(host)))
    }
}

/// First currency amount with a magnitude suffix anywhere in the text.
pub fn parse_money(text: &str) -> Option<f64> {
    first_amount(&MONEY_RE, text)
}

/// First integer adjacent to a headcount word, thousands separators
/// stripped.
pub fn parse_headcount(text: &str) -> Option<u32> {
    EMPLOYEE_RES.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        caps.get(1)?.as_str().replace(',', "").parse::<u32>().ok()
    })
}

fn first_amount(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures_iter(text)
        .find_map(|caps| amount_from_captures(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn max_amount(patterns: &[Regex], text: &str) -> Option<f64> {
    let mut best: Option<f64> = None;
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            let (Some(number), Some(suffix)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if let Some(amount) = amount_from_captures(number.as_str(), suffix.as_str()) {
                best = Some(best.map_or(amount, |current| current.max(amount)));
            }
        }
    }
    best
}

fn amount_from_captures(number: &str, suffix: &str) -> Option<f64> {
    let base: f64 = number.replace(',', "").parse().ok()?;
    let multiplier = match suffix.to_ascii_lowercase().as_str() {
        "k" | "thousand" => 1e3,
        "m" | "million" => 1e6,
        "b" | "billion" => 1e9,
        _ => return None,
    };

    let amount = base * multiplier;
    amount.is_finite().then_some(amount)
}

fn extract_rounds(text: &str) -> Vec<FundingRound> {
    let mut rounds = Vec::new();

    for (index, pattern) in ROUND_RES.iter().enumerate() {
        for caps in pattern.captures_iter(text) {
            // The two round patterns carry (amount, suffix, label) and
            // (label, amount, suffix) respectively.
            let (number, suffix, label) = if index == 0 {
                (caps.get(1), caps.get(2), caps.get(3))
            } else {
                (caps.get(2), caps.get(3), caps.get(1))
            };

            let (Some(number), Some(suffix), Some(label)) = (number, suffix, label) else {
                continue;
            };
            let Some(amount) = amount_from_captures(number.as_str(), suffix.as_str()) else {
                continue;
            };

            let label = normalize_round_label(label.as_str());
            if let Ok(round) = FundingRound::new(None, Some(amount), Some(&label)) {
                rounds.push(round);
            }
        }
    }

    rounds
}

fn normalize_round_label(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut capitalize = true;

    for ch in collapsed.chars() {
        if capitalize && ch.is_ascii_alphabetic() {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch.to_ascii_lowercase());
        }
        capitalize = ch == ' ' || ch == '-';
    }

    out
}

fn extract_person_names(patterns: &[Regex], text: &str) -> BTreeSet<String> {
    extract_names(patterns, text, clean_person_name)
}

fn extract_org_names(patterns: &[Regex], text: &str) -> BTreeSet<String> {
    extract_names(patterns, text, clean_org_name)
}

fn extract_names(
    patterns: &[Regex],
    text: &str,
    clean: fn(&str) -> Option<String>,
) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            let Some(span) = caps.get(1) else {
                continue;
            };
            for candidate in split_name_list(span.as_str()) {
                if let Some(name) = clean(candidate) {
                    names.insert(name);
                }
            }
        }
    }

    names
}

fn split_name_list(span: &str) -> impl Iterator<Item = &str> {
    span.split(',')
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split(" & "))
}

/// Person names: 1-4 tokens, trailing non-capitalized spillover trimmed,
/// length window 3-50 to reject matching artifacts.
fn clean_person_name(raw: &str) -> Option<String> {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();

    while let Some(last) = tokens.last() {
        if last.chars().next().is_some_and(|ch| ch.is_ascii_uppercase()) {
            break;
        }
        tokens.pop();
    }

    if tokens.is_empty() || tokens.len() > 4 {
        return None;
    }

    finish_name(tokens.join(" "))
}

/// Organization names: allow lowercase connectives ("Bank of America") and
/// up to 6 tokens, same length window.
fn clean_org_name(raw: &str) -> Option<String> {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();

    while let Some(last) = tokens.last() {
        let keeps = last.chars().next().is_some_and(|ch| ch.is_ascii_uppercase())
            || matches!(*last, "&");
        if keeps {
            break;
        }
        tokens.pop();
    }

    if tokens.is_empty() || tokens.len() > 6 {
        return None;
    }

    finish_name(tokens.join(" "))
}

fn finish_name(name: String) -> Option<String> {
    let name = name.trim_matches(['.', ',', '-']).trim().to_owned();
    let len = name.chars().count();

    if !(3..=50).contains(&len) {
        return None;
    }
    if name.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    if !name.chars().next().is_some_and(|ch| ch.is_ascii_uppercase()) {
        return None;
    }

    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::with_current_year(2026)
    }

    #[test]
    fn parses_suffixed_amounts() {
        assert_eq!(parse_money("raised $2.5M last year"), Some(2_500_000.0));
        assert_eq!(parse_money("a $1,200 thousand grant"), Some(1_200_000.0));
        assert_eq!(parse_money("worth $3 billion overall"), Some(3_000_000_000.0));
    }

    #[test]
    fn amount_without_numeral_is_discarded() {
        assert_eq!(parse_money("raised $ million in funding"), None);
        assert_eq!(parse_money("no money mentioned here"), None);
    }

    #[test]
    fn funding_takes_maximum_of_mentions() {
        let record = extractor().extract(
            "Acme raised $2 million in 2020 and secured $6 million in 2022.",
            &[FieldKind::Funding],
        );
        assert_eq!(record.funding_raised, Some(6_000_000.0));
    }

    #[test]
    fn headcount_strips_thousands_separators() {
        assert_eq!(parse_headcount("over 1,200 employees worldwide"), Some(1_200));
        assert_eq!(parse_headcount("a team of 45"), Some(45));
        assert_eq!(parse_headcount("serving many customers"), None);
    }

    #[test]
    fn founded_year_respects_plausible_window() {
        let ex = extractor();
        let record = ex.extract("Founded in 2015, Acme ...", &[FieldKind::Profile]);
        assert_eq!(record.founded_year, Some(2015));

        let future = ex.extract("founded in 2031", &[FieldKind::Profile]);
        assert_eq!(future.founded_year, None);

        let ancient = ex.extract("established in 1899", &[FieldKind::Profile]);
        assert_eq!(ancient.founded_year, None);
    }

    #[test]
    fn extracts_ceo_from_both_orderings() {
        let ex = extractor();
        let leading = ex.extract("CEO Jane Doe announced the round", &[FieldKind::Leadership]);
        assert_eq!(leading.ceo.as_deref(), Some("Jane Doe"));

        let trailing = ex.extract("Marcus Webb is CEO of Acme", &[FieldKind::Leadership]);
        assert_eq!(trailing.ceo.as_deref(), Some("Marcus Webb"));
    }

    #[test]
    fn founders_split_and_dedupe() {
        let record = extractor().extract(
            "Acme was founded by Jane Doe and John Smith. Co-founder John Smith previously ...",
            &[FieldKind::Leadership],
        );
        let founders: Vec<&str> = record.founders.iter().map(String::as_str).collect();
        assert_eq!(founders, vec!["Jane Doe", "John Smith"]);
    }

    #[test]
    fn investors_allow_lowercase_connectives() {
        let record = extractor().extract(
            "The round was led by Sequoia Capital and Bank of America, backed by Accel Partners.",
            &[FieldKind::Funding],
        );
        assert!(record.investors.contains("Sequoia Capital"));
        assert!(record.investors.contains("Bank of America"));
        assert!(record.investors.contains("Accel Partners"));
    }

    #[test]
    fn rounds_capture_amount_and_label() {
        let record = extractor().extract(
            "Acme closed a $5 million Seed round; the Series A funding of $18M followed.",
            &[FieldKind::Funding],
        );
        assert_eq!(record.funding_rounds.len(), 2);
        assert_eq!(record.funding_rounds[0].amount, Some(5_000_000.0));
        assert_eq!(record.funding_rounds[0].round_type.as_deref(), Some("Seed"));
        assert_eq!(record.funding_rounds[1].amount, Some(18_000_000.0));
        assert_eq!(
            record.funding_rounds[1].round_type.as_deref(),
            Some("Series A")
        );
    }

    #[test]
    fn financial_hints_reach_revenue_and_market_cap() {
        let record = extractor().extract(
            "Annual revenue of $40 million; market cap of $1.2 billion; valued at $900M.",
            &[FieldKind::Financials],
        );
        assert_eq!(record.revenue, Some(40_000_000.0));
        assert_eq!(record.market_cap, Some(1_200_000_000.0));
        assert_eq!(record.valuation, Some(900_000_000.0));
    }

    #[test]
    fn website_skips_aggregator_hosts() {
        let record = extractor().extract(
            "See https://www.crunchbase.com/organization/acme and https://acme.example.",
            &[FieldKind::Profile],
        );
        assert_eq!(record.website.as_deref(), Some("https://acme.example"));
    }

    #[test]
    fn hints_gate_unrelated_patterns() {
        let record = extractor().extract(
            "CEO Jane Doe raised $5 million with 120 employees",
            &[FieldKind::Headcount],
        );
        assert_eq!(record.employees, Some(120));
        assert_eq!(record.ceo, None);
        assert_eq!(record.funding_raised, None);
    }

    #[test]
    fn empty_hint_set_extracts_everything() {
        let record = extractor().extract(
            "Founded in 2018, Acme raised $5 million. CEO Jane Doe leads 40 people.",
            &[],
        );
        assert_eq!(record.founded_year, Some(2018));
        assert_eq!(record.funding_raised, Some(5_000_000.0));
        assert_eq!(record.ceo.as_deref(), Some("Jane Doe"));
        assert_eq!(record.employees, Some(40));
    }

    #[test]
    fn malformed_input_never_panics() {
        let ex = extractor();
        for text in ["", "$$$$", "\u{0000}\u{FFFF}", "$9,,9 M employees of CEO"] {
            let _ = ex.extract(text, &[]);
        }
    }
}
