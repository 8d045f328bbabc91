//! Injection-safe OR filters for free-text listing search.
//!
//! A filter expression is a comma-separated list of clauses, one per field:
//!
//! ```text
//! name.ilike."%gedung%",location.ilike."%gedung%"
//! ```
//!
//! The value is always double-quoted, so separators and grouping characters
//! typed by the user (`,` `(` `)` `.`) stay inside the operand. Inside the quotes
//! the value is a LIKE pattern `%<text>%` whose own `%`, `_` and `\` are
//! backslash-escaped; the quoting layer then escapes `\` and `"` once more.

pub mod parse;

use serde::{Deserialize, Serialize};

pub use parse::{parse_filter_expression, FilterParseError};

/// A text column of `products` that free-text search may match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchableField {
    Name,
    Description,
    Category,
    Location,
}

/// Fields searched by the listing feed and quick search.
pub const LISTING_SEARCH_FIELDS: [SearchableField; 4] = [
    SearchableField::Name,
    SearchableField::Description,
    SearchableField::Category,
    SearchableField::Location,
];

impl SearchableField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchableField::Name => "name",
            SearchableField::Description => "description",
            SearchableField::Category => "category",
            SearchableField::Location => "location",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SearchableField::Name),
            "description" => Some(SearchableField::Description),
            "category" => Some(SearchableField::Category),
            "location" => Some(SearchableField::Location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    ContainsCaseInsensitive,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::ContainsCaseInsensitive => "ilike",
        }
    }
}

/// One `field contains value` clause. `value` is LIKE-escaped: it never holds a
/// bare `%`, `_` or `\`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTerm {
    pub field: SearchableField,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterTerm {
    pub fn contains(field: SearchableField, raw: &str) -> Self {
        FilterTerm {
            field,
            operator: FilterOperator::ContainsCaseInsensitive,
            value: escape_like(raw),
        }
    }

    /// LIKE pattern to bind against the column, with `\` as the escape character.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.value)
    }

    /// The text the user actually searched for.
    pub fn literal(&self) -> String {
        let mut out = String::with_capacity(self.value.len());
        let mut chars = self.value.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    pub fn to_expression(&self) -> String {
        format!(
            "{}.{}.{}",
            self.field.as_str(),
            self.operator.as_str(),
            quote(&self.like_pattern())
        )
    }
}

/// Build `field1 ILIKE %q% OR field2 ILIKE %q% ...` as a filter expression.
///
/// Total over all inputs: a blank query still yields a well-formed expression
/// and an empty `fields` slice yields an empty string. Callers decide whether
/// the query is worth issuing.
pub fn build_safe_filter_expression(raw_query: &str, fields: &[SearchableField]) -> String {
    fields
        .iter()
        .map(|field| FilterTerm::contains(*field, raw_query).to_expression())
        .collect::<Vec<_>>()
        .join(",")
}

/// Escape LIKE wildcards so the text only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
