//! FILENAME: core/catalogue/src/search.rs
//! PURPOSE: Field-by-field boolean search and relevance ranking.
//! CONTEXT: Every text field is parsed once into a `query_parser::Query`
//! and dispatched through `SearchField`, which fixes how a single term is
//! decided for that field. Fields combine with AND; an absent or blank
//! field places no constraint.
//!
//! FIELD MATCHERS:
//! - code: exact, case-insensitive
//! - title, time_variable, organisation: substring, case-insensitive
//! - variables: any variable contains the term, case-insensitive

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cube::log_debug;
use query_parser::{ParseError, Query};

use crate::entry::{CatalogueEntry, Listing};
use crate::error::{CatalogueError, Result};
use crate::period::TimeRange;

// ============================================================================
// FIELDS
// ============================================================================

/// How a single search term is decided against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Exact,
    Substring,
    ListMembership,
}

/// The searchable text fields of a catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Code,
    Title,
    Variables,
    TimeVariable,
    Organisation,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::Code,
        SearchField::Title,
        SearchField::Variables,
        SearchField::TimeVariable,
        SearchField::Organisation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchField::Code => "code",
            SearchField::Title => "title",
            SearchField::Variables => "variables",
            SearchField::TimeVariable => "time_variable",
            SearchField::Organisation => "organisation",
        }
    }

    pub fn matcher(&self) -> Matcher {
        match self {
            SearchField::Code => Matcher::Exact,
            SearchField::Variables => Matcher::ListMembership,
            SearchField::Title | SearchField::TimeVariable | SearchField::Organisation => {
                Matcher::Substring
            }
        }
    }

    /// Lowercased field values of `entry`. Empty when the entry has none.
    fn values(&self, entry: &CatalogueEntry) -> Vec<String> {
        match self {
            SearchField::Code => vec![entry.code.to_lowercase()],
            SearchField::Title => vec![entry.title.to_lowercase()],
            SearchField::Variables => entry.variables.iter().map(|v| v.to_lowercase()).collect(),
            SearchField::TimeVariable => entry
                .time_variable
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            SearchField::Organisation if entry.organisation.is_empty() => Vec::new(),
            SearchField::Organisation => vec![entry.organisation.to_lowercase()],
        }
    }

    /// Whether `query` holds for this field of `entry`. An entry without a
    /// value for the field never matches.
    fn matches(&self, query: &Query, entry: &CatalogueEntry) -> bool {
        let values = self.values(entry);
        if values.is_empty() {
            return false;
        }
        let matcher = self.matcher();
        query.evaluate(&|term: &str| {
            let term = term.to_lowercase();
            match matcher {
                Matcher::Exact => values.iter().any(|v| *v == term),
                Matcher::Substring | Matcher::ListMembership => {
                    values.iter().any(|v| v.contains(&term))
                }
            }
        })
    }
}

// ============================================================================
// QUERY
// ============================================================================

/// Criteria for `search`. Every field is optional; none set is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variables: Option<String>,
    #[serde(default)]
    pub time_variable: Option<String>,
    #[serde(default)]
    pub organisation: Option<String>,
    #[serde(default)]
    pub exceptional: Option<bool>,
    /// A period or `"(start, end)"`; keeps entries whose date range overlaps.
    #[serde(default)]
    pub time_range: Option<String>,
    /// Keeps entries updated on or after this date.
    #[serde(default)]
    pub updated_since: Option<NaiveDate>,
}

impl SearchQuery {
    pub fn new() -> Self {
        SearchQuery::default()
    }

    pub fn field(mut self, field: SearchField, expression: impl Into<String>) -> Self {
        *self.slot(field) = Some(expression.into());
        self
    }

    pub fn title(self, expression: impl Into<String>) -> Self {
        self.field(SearchField::Title, expression)
    }

    pub fn variables(self, expression: impl Into<String>) -> Self {
        self.field(SearchField::Variables, expression)
    }

    pub fn code(self, expression: impl Into<String>) -> Self {
        self.field(SearchField::Code, expression)
    }

    pub fn exceptional(mut self, exceptional: bool) -> Self {
        self.exceptional = Some(exceptional);
        self
    }

    pub fn time_range(mut self, range: impl Into<String>) -> Self {
        self.time_range = Some(range.into());
        self
    }

    pub fn updated_since(mut self, date: NaiveDate) -> Self {
        self.updated_since = Some(date);
        self
    }

    pub fn get(&self, field: SearchField) -> Option<&str> {
        match field {
            SearchField::Code => self.code.as_deref(),
            SearchField::Title => self.title.as_deref(),
            SearchField::Variables => self.variables.as_deref(),
            SearchField::TimeVariable => self.time_variable.as_deref(),
            SearchField::Organisation => self.organisation.as_deref(),
        }
    }

    fn slot(&mut self, field: SearchField) -> &mut Option<String> {
        match field {
            SearchField::Code => &mut self.code,
            SearchField::Title => &mut self.title,
            SearchField::Variables => &mut self.variables,
            SearchField::TimeVariable => &mut self.time_variable,
            SearchField::Organisation => &mut self.organisation,
        }
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        SearchField::ALL
            .iter()
            .all(|f| self.get(*f).map_or(true, |e| e.trim().is_empty()))
            && self.exceptional.is_none()
            && self.time_range.as_deref().map_or(true, |r| r.trim().is_empty())
            && self.updated_since.is_none()
    }

    /// Parses every field, failing on the first malformed one.
    pub fn compile(&self) -> Result<CompiledQuery> {
        let mut fields = Vec::new();
        for field in SearchField::ALL {
            let Some(expression) = self.get(field) else {
                continue;
            };
            let parsed = query_parser::parse(expression).map_err(|source| {
                CatalogueError::InvalidQuery {
                    field: field.name().to_string(),
                    source,
                }
            })?;
            if !parsed.is_empty() {
                fields.push((field, parsed));
            }
        }

        let time_range = match self.time_range.as_deref().map(str::trim) {
            Some(range) if !range.is_empty() => Some(range.parse::<TimeRange>().map_err(
                |message| CatalogueError::InvalidQuery {
                    field: "time_range".to_string(),
                    source: ParseError::new(message),
                },
            )?),
            _ => None,
        };

        Ok(CompiledQuery {
            fields,
            exceptional: self.exceptional,
            time_range,
            updated_since: self.updated_since,
        })
    }
}

/// A `SearchQuery` with every expression parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    fields: Vec<(SearchField, Query)>,
    exceptional: Option<bool>,
    time_range: Option<TimeRange>,
    updated_since: Option<NaiveDate>,
}

impl CompiledQuery {
    pub fn matches(&self, entry: &CatalogueEntry) -> bool {
        if let Some(exceptional) = self.exceptional {
            if entry.exceptional != exceptional {
                return false;
            }
        }
        if let Some(since) = self.updated_since {
            match entry.updated {
                Some(updated) if updated.date_naive() >= since => {}
                _ => return false,
            }
        }
        if let Some(range) = &self.time_range {
            match entry.date_range.as_deref() {
                Some(date_range) if range.overlaps(date_range) => {}
                _ => return false,
            }
        }
        self.fields
            .iter()
            .all(|(field, query)| field.matches(query, entry))
    }

    /// Positive title and variable terms found in the entry.
    pub fn relevance(&self, entry: &CatalogueEntry) -> usize {
        self.fields
            .iter()
            .map(|(field, query)| {
                let haystack = match field {
                    SearchField::Title => entry.title.to_lowercase(),
                    SearchField::Variables => entry.variables.join(" ").to_lowercase(),
                    _ => return 0,
                };
                query
                    .positive_terms()
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .count()
            })
            .sum()
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Entries matching every criterion, in listing order. An empty query
/// returns the listing unchanged.
pub fn search(listing: &Listing, query: &SearchQuery) -> Result<Listing> {
    if query.is_empty() {
        return Ok(listing.clone());
    }
    Ok(filter(listing, &query.compile()?))
}

/// `search`, then sorted by relevance descending with ties broken by
/// most recent update.
pub fn rank(listing: &Listing, query: &SearchQuery) -> Result<Listing> {
    let compiled = query.compile()?;
    let mut scored: Vec<(usize, CatalogueEntry)> = filter(listing, &compiled)
        .into_entries()
        .into_iter()
        .map(|entry| (compiled.relevance(&entry), entry))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| match score_b.cmp(score_a) {
        Ordering::Equal => b.updated.cmp(&a.updated),
        other => other,
    });
    Ok(scored.into_iter().map(|(_, entry)| entry).collect())
}

fn filter(listing: &Listing, compiled: &CompiledQuery) -> Listing {
    let result: Listing = listing
        .iter()
        .filter(|entry| compiled.matches(entry))
        .cloned()
        .collect();

    log_debug!(
        "CATALOGUE",
        "search kept {} of {} entries",
        result.len(),
        listing.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, title: &str, variables: &[&str]) -> CatalogueEntry {
        CatalogueEntry {
            code: code.to_string(),
            title: title.to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            time_variable: None,
            date_range: None,
            updated: None,
            organisation: String::new(),
            exceptional: false,
        }
    }

    #[test]
    fn code_match_is_exact() {
        let listing = Listing::new(vec![entry("FY003A", "a", &[]), entry("FY003", "b", &[])]);
        let result = search(&listing, &SearchQuery::new().code("fy003")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries()[0].code, "FY003");
    }

    #[test]
    fn title_is_substring_expression() {
        let listing = Listing::new(vec![
            entry("A", "Population by County", &[]),
            entry("B", "Census Population by Age", &[]),
            entry("C", "Births", &[]),
        ]);
        let result = search(&listing, &SearchQuery::new().title("population NOT census")).unwrap();
        let codes: Vec<&str> = result.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["A"]);
    }

    #[test]
    fn invalid_expression_names_field() {
        let err = search(&Listing::default(), &SearchQuery::new().variables("(Year")).unwrap_err();
        match err {
            CatalogueError::InvalidQuery { field, .. } => assert_eq!(field, "variables"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unreadable_time_range_is_invalid() {
        let err = search(&Listing::default(), &SearchQuery::new().time_range("whenever")).unwrap_err();
        assert!(matches!(err, CatalogueError::InvalidQuery { ref field, .. } if field == "time_range"));
    }

    #[test]
    fn missing_field_value_never_matches() {
        let listing = Listing::new(vec![entry("A", "x", &[])]);
        let query = SearchQuery::new().field(SearchField::TimeVariable, "NOT Year");
        assert!(search(&listing, &query).unwrap().is_empty());
    }

    #[test]
    fn relevance_counts_title_and_variable_terms() {
        let compiled = SearchQuery::new()
            .title("population county")
            .variables("Sex")
            .compile()
            .unwrap();
        let e = entry("A", "Population by County", &["Sex", "Age"]);
        assert_eq!(compiled.relevance(&e), 3);
    }
}
