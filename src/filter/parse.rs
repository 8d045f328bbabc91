use std::fmt;

use super::{FilterOperator, FilterTerm, SearchableField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    UnknownField(String),
    UnsupportedOperator(String),
    MissingValue,
    UnquotedValue,
    UnterminatedQuote,
    NotContainsPattern(String),
    UnescapedWildcard(String),
    TrailingInput(String),
}

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterParseError::UnknownField(name) => write!(f, "unknown field '{}'", name),
            FilterParseError::UnsupportedOperator(op) => {
                write!(f, "unsupported operator '{}'", op)
            }
            FilterParseError::MissingValue => write!(f, "clause has no value"),
            FilterParseError::UnquotedValue => write!(f, "clause value must be quoted"),
            FilterParseError::UnterminatedQuote => write!(f, "unterminated quoted value"),
            FilterParseError::NotContainsPattern(p) => {
                write!(f, "pattern '{}' is not of the form %text%", p)
            }
            FilterParseError::UnescapedWildcard(p) => {
                write!(f, "pattern '{}' contains an unescaped wildcard", p)
            }
            FilterParseError::TrailingInput(rest) => {
                write!(f, "unexpected input after clause: '{}'", rest)
            }
        }
    }
}

impl std::error::Error for FilterParseError {}

/// Parse an expression produced by [`super::build_safe_filter_expression`] back
/// into its terms. An empty expression has no terms.
pub fn parse_filter_expression(expr: &str) -> Result<Vec<FilterTerm>, FilterParseError> {
    let mut terms = Vec::new();
    if expr.is_empty() {
        return Ok(terms);
    }

    let mut rest = expr;
    loop {
        let (term, remaining) = parse_clause(rest)?;
        terms.push(term);
        if remaining.is_empty() {
            break;
        }
        rest = remaining
            .strip_prefix(',')
            .ok_or_else(|| FilterParseError::TrailingInput(remaining.to_string()))?;
    }

    Ok(terms)
}

fn parse_clause(input: &str) -> Result<(FilterTerm, &str), FilterParseError> {
    let (field_name, rest) = input
        .split_once('.')
        .ok_or(FilterParseError::MissingValue)?;
    let field = SearchableField::from_name(field_name)
        .ok_or_else(|| FilterParseError::UnknownField(field_name.to_string()))?;

    let (op, rest) = rest
        .split_once('.')
        .ok_or(FilterParseError::MissingValue)?;
    let operator = match op {
        "ilike" => FilterOperator::ContainsCaseInsensitive,
        other => return Err(FilterParseError::UnsupportedOperator(other.to_string())),
    };

    let (pattern, rest) = parse_quoted(rest)?;
    let value = contains_operand(&pattern)?;

    Ok((
        FilterTerm {
            field,
            operator,
            value,
        },
        rest,
    ))
}

fn parse_quoted(input: &str) -> Result<(String, &str), FilterParseError> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        Some(_) => return Err(FilterParseError::UnquotedValue),
        None => return Err(FilterParseError::MissingValue),
    }

    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => return Err(FilterParseError::UnterminatedQuote),
            },
            '"' => return Ok((value, &input[i + 1..])),
            _ => value.push(c),
        }
    }

    Err(FilterParseError::UnterminatedQuote)
}

// `%text%` -> `text`, where `text` must keep every wildcard escaped.
fn contains_operand(pattern: &str) -> Result<String, FilterParseError> {
    let inner = pattern
        .strip_prefix('%')
        .and_then(|p| p.strip_suffix('%'))
        .ok_or_else(|| FilterParseError::NotContainsPattern(pattern.to_string()))?;

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\' | '%' | '_') => {}
                // a lone trailing backslash escapes the closing wildcard
                _ => return Err(FilterParseError::NotContainsPattern(pattern.to_string())),
            },
            '%' | '_' => return Err(FilterParseError::UnescapedWildcard(pattern.to_string())),
            _ => {}
        }
    }

    Ok(inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::build_safe_filter_expression;

    #[test]
    fn test_parse_two_clauses() {
        let terms =
            parse_filter_expression(r#"name.ilike."%bali%",location.ilike."%bali%""#).unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].field, SearchableField::Name);
        assert_eq!(terms[1].field, SearchableField::Location);
        assert_eq!(terms[1].literal(), "bali");
    }

    #[test]
    fn test_empty_expression() {
        assert!(parse_filter_expression("").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = parse_filter_expression(r#"vendor_id.ilike."%x%""#).unwrap_err();
        assert_eq!(err, FilterParseError::UnknownField("vendor_id".to_string()));
    }

    #[test]
    fn test_rejects_other_operators() {
        let err = parse_filter_expression(r#"name.eq."%x%""#).unwrap_err();
        assert_eq!(err, FilterParseError::UnsupportedOperator("eq".to_string()));
    }

    #[test]
    fn test_rejects_unquoted_value() {
        let err = parse_filter_expression("name.ilike.%x%,status.eq.approved").unwrap_err();
        assert_eq!(err, FilterParseError::UnquotedValue);
    }

    #[test]
    fn test_rejects_unterminated_quote() {
        let err = parse_filter_expression(r#"name.ilike."%x%"#).unwrap_err();
        assert_eq!(err, FilterParseError::UnterminatedQuote);
    }

    #[test]
    fn test_rejects_bare_wildcard() {
        let err = parse_filter_expression(r#"name.ilike."%a%b%""#).unwrap_err();
        assert!(matches!(err, FilterParseError::UnescapedWildcard(_)));
    }

    #[test]
    fn test_rejects_escaped_closing_wildcard() {
        // pattern %a\% : the final % is literal, so this is not a contains pattern
        let err = parse_filter_expression(r#"name.ilike."%a\\%""#).unwrap_err();
        assert!(matches!(err, FilterParseError::NotContainsPattern(_)));
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        let err = parse_filter_expression(r#"name.ilike."%a%")"#).unwrap_err();
        assert_eq!(err, FilterParseError::TrailingInput(")".to_string()));
    }

    #[test]
    fn test_hostile_input_round_trips_as_literal() {
        let raw = r#"%)," \\ .or(name.eq.x"#;
        let expr = build_safe_filter_expression(raw, &[SearchableField::Description]);
        let terms = parse_filter_expression(&expr).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].field, SearchableField::Description);
        assert_eq!(terms[0].literal(), raw);
    }

    #[test]
    fn test_trailing_backslash_in_query() {
        let expr = build_safe_filter_expression("dekor\\", &[SearchableField::Name]);
        let terms = parse_filter_expression(&expr).unwrap();
        assert_eq!(terms[0].literal(), "dekor\\");
        assert_eq!(terms[0].like_pattern(), r"%dekor\\%");
    }
}
