//! Citation grammar and identifier resolution.
//!
//! A citation in running text looks like "artikel 3 i Europaparlamentets
//! och rådets förordning (EU) nr 1234/2010". The grammar is one composed
//! regex: optional article part, optional institution, act type, optional
//! era prefix, and the number pair. Resolution turns the number pair into a
//! canonical identifier, using era and validity heuristics to decide which
//! field is the year.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::{Captures, Regex};

/// Optional leading article part, e.g. "artikel 4.1, 4.2 och 5 i".
const R_ARTIKEL: &str = r"(?:artikel\s+(?P<art_num>\d[\w\.\-\(\)]*(?:(?:\s*[\,\-]\s*|\s+(?:och|till|med)\s+|\s+)(?:[a-z]\b|\d[\w\.\-\(\)]*))*)(?:\s+i)?\s+)?";

/// Optional issuing institution.
const R_INST: &str = r"(?P<inst>Europaparlamentets\s+och\s+rådets|Europeiska\s+[\w\s]+\s+(?:myndighetens|centralbankens)|rådets|kommissionens)?\s*";

/// Act type deciding the sector letter.
const R_TYP: &str = r"(?P<typ>förordning|direktiv)";

/// Optional era prefix, e.g. "(EU) nr".
const R_PREFIX: &str =
    r"(?:\s*\(?(?P<era_prefix>EU|EG|EEG|Euratom)\)?\s*)?(?:\s*nr\.?)?\s*";

/// The number pair, optionally with a trailing era suffix as used by
/// directives ("96/34/EG").
const R_NUMMER: &str = r"(?P<n1>\d{2,4})/(?P<n2>\d{1,5})(?:/(?P<suffix>[A-Z]{2,3}))?";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?i){R_ARTIKEL}{R_INST}{R_TYP}{R_PREFIX}{R_NUMMER}"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static ART_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[a-z]*)").expect("valid regex"));

/// Outcome of resolving one citation match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A canonical identifier, with an article fragment when the citation
    /// named one.
    Resolved {
        celex: String,
        fragment: Option<String>,
    },

    /// The citation matched the grammar but no plausible year could be
    /// derived; `celex` is the implausible identifier for the report.
    Suspect { celex: String },
}

/// Resolve a grammar match into an identifier.
#[must_use]
pub fn resolve(caps: &Captures<'_>) -> Resolution {
    let typ = caps.name("typ").map_or("", |m| m.as_str()).to_lowercase();
    let letter = if typ.starts_with("förordning") { 'R' } else { 'L' };

    let era = caps
        .name("era_prefix")
        .or_else(|| caps.name("suffix"))
        .map(|m| m.as_str().to_uppercase());

    let (Some(n1), Some(n2)) = (caps.name("n1"), caps.name("n2")) else {
        let literal = caps.get(0).map_or("", |m| m.as_str());
        return Resolution::Suspect {
            celex: format!("PARSE_ERROR: {literal}"),
        };
    };
    let (n1, n2) = (n1.as_str(), n2.as_str());

    let Some((year, seq)) = assign_year(n1, n2, era.as_deref()) else {
        // Neither field looks like a year; report the identifier the
        // conventional year/number order would have produced.
        return Resolution::Suspect {
            celex: format!(
                "3{}{letter}{:04}",
                expand_year(n1).unwrap_or(0),
                parse_num(n2).unwrap_or(0)
            ),
        };
    };

    let celex = format!("3{year}{letter}{seq:04}");

    let fragment = caps
        .name("art_num")
        .and_then(|m| ART_FRAGMENT.find(m.as_str()))
        .map(|m| format!("#A{}", m.as_str()));

    Resolution::Resolved { celex, fragment }
}

fn parse_num(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

/// Exactly-two-digit fields are expanded around the 1950 pivot; every
/// other width is taken literally, so a one-digit sequence number never
/// turns into a year.
fn expand_year(raw: &str) -> Option<u32> {
    let value = parse_num(raw)?;
    if raw.len() == 2 {
        Some(if value > 50 { 1900 + value } else { 2000 + value })
    } else {
        Some(value)
    }
}

/// Community legislation starts in 1951; acts dated one year ahead of
/// publication occur.
fn is_valid_year(year: u32) -> bool {
    (1951..=current_year() + 1).contains(&year)
}

fn current_year() -> u32 {
    u32::try_from(Utc::now().year()).unwrap_or(0)
}

/// The era abbreviation bounds the plausible years: EEC ran until the
/// Maastricht treaty, EC until Lisbon, EU after that.
fn fits_in_era(year: u32, era: &str) -> bool {
    match era {
        "EEG" => (1957..=1993).contains(&year),
        "EG" => (1993..=2009).contains(&year),
        "EU" => year >= 2009,
        _ => true,
    }
}

/// Decide which field of the pair is the year. When validity alone does
/// not settle it, the era bounds break the tie; when both remain
/// plausible, the first field is taken as the year (the order directives
/// traditionally use).
fn assign_year(n1: &str, n2: &str, era: Option<&str>) -> Option<(u32, u32)> {
    let v1 = parse_num(n1)?;
    let v2 = parse_num(n2)?;
    let y1 = expand_year(n1)?;
    let y2 = expand_year(n2)?;

    match (is_valid_year(y1), is_valid_year(y2)) {
        (true, false) => Some((y1, v2)),
        (false, true) => Some((y2, v1)),
        (false, false) => None,
        (true, true) => {
            if let Some(era) = era {
                match (fits_in_era(y1, era), fits_in_era(y2, era)) {
                    (true, false) => return Some((y1, v2)),
                    (false, true) => return Some((y2, v1)),
                    _ => {}
                }
            }
            Some((y1, v2))
        }
    }
}
