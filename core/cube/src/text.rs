//! FILENAME: core/cube/src/text.rs
//! PURPOSE: Label repair and sanitisation.
//! CONTEXT: Some published tables carry Irish characters with a broken
//! encoding, and the same concept is labelled several ways across tables
//! ("Counties", "Admin Counties", ...). `repair_text` fixes the former on
//! parse; `sanitise_label` is the opt-in normalisation of the latter.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

/// Misencoded characters and their intended replacements.
const MISENCODED_CHARACTERS: &[(char, char)] = &[
    ('┴', 'Á'),
    ('ß', 'á'),
    ('╔', 'É'),
    ('Θ', 'é'),
    ('φ', 'í'),
    ('╙', 'Ó'),
    ('≤', 'ó'),
    ('·', 'ú'),
];

/// Canonical names for labels that vary between tables (plurals, typos).
static CANONICAL_LABELS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        (
            "Administrative Counties and Local Government Districts",
            "Administrative County and Local Government District",
        ),
        ("Admin Counties", "Administrative County"),
        ("Admin County", "Administrative County"),
        ("Administrative Counties", "Administrative County"),
        ("Adminstrative Counties", "Administrative County"),
        ("Administrative Counties 2019", "Administrative County 2019"),
        ("Catchement", "Catchment Area"),
        ("Catchment", "Catchment Area"),
        ("CensusYear", "Census Year"),
        ("Census year", "Census Year"),
        ("Counties", "County"),
        ("Counties and Cities", "County and City"),
        ("County and Cities", "County and City"),
        ("Counties and HSE Regions", "County and HSE Region"),
        ("Countries", "Country"),
        ("Electoral Divisions", "Electoral Division"),
        ("HalfYear", "Half Year"),
        ("Licencing Authority", "Licensing Authority"),
        ("Local Electoral Areas", "Local Electoral Area"),
        ("Martial Status of Mother", "Marital Status of Mother"),
        ("NUTS 2 Regions", "NUTS 2 Region"),
        ("NUTS 3", "NUTS 3 Region"),
        ("NUTS 3 region", "NUTS 3 Region"),
        ("NUTS 3 Regions", "NUTS 3 Region"),
        ("NUTS3 Regions", "NUTS 3 Region"),
        ("NUTS3 regions", "NUTS 3 Region"),
        ("Nuts 2 Region", "NUTS 2 Region"),
        ("Principle Countries", "Principal Countries"),
        ("Principle Economic Status", "Principal Economic Status"),
        ("Provinces", "Province"),
        ("Settlements", "Settlement"),
        ("Small Areas", "Small Area"),
    ]
    .into_iter()
    .collect()
});

static SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*/\s*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static URL_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\[url=(.*?)\](.*?)\[/url\]\s*").unwrap()
});

/// Replaces misencoded Irish characters with the intended ones.
pub fn repair_text(text: &str) -> String {
    text.chars()
        .map(|ch| {
            MISENCODED_CHARACTERS
                .iter()
                .find(|(bad, _)| *bad == ch)
                .map(|(_, good)| *good)
                .unwrap_or(ch)
        })
        .collect()
}

/// Normalises a label: `&` becomes `and`, spacing around `/` is removed,
/// whitespace is collapsed and trimmed, one trailing full stop is dropped,
/// and known label variants are mapped to their canonical name.
pub fn sanitise_label(label: &str) -> String {
    let result = label.replace('&', "and");
    let result = SLASH.replace_all(&result, "/");
    let result = WHITESPACE.replace_all(&result, " ");
    let mut result = result.trim().to_string();

    if let Some(stripped) = result.strip_suffix('.') {
        result = stripped.trim_end().to_string();
    }

    match CANONICAL_LABELS.get(result.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => result,
    }
}

/// Cleans a free-text note: strips `[i]`/`[b]` markup, collapses
/// whitespace and rewrites `[url=U]T[/url]` as `T (U)`.
pub fn clean_note(note: &str) -> String {
    let cleaned = note
        .trim()
        .replace("[i]", "")
        .replace("[/i]", "")
        .replace("[b]", "")
        .replace("[/b]", "")
        .replace('\n', " ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = URL_TAG.replace_all(cleaned.trim(), |caps: &regex::Captures| {
        format!(" {} ({}) ", caps[2].trim(), caps[1].trim())
    });
    WHITESPACE.replace_all(cleaned.trim(), " ").into_owned()
}
