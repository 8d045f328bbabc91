use std::fmt;

use crate::filter::FilterParseError;

/// Unified error type for store, configuration and search operations.
#[derive(Debug)]
pub enum AppError {
    Store(sqlite::Error),
    Filter(FilterParseError),
    Config(String),
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlite::Error> for AppError {
    fn from(e: sqlite::Error) -> Self {
        AppError::Store(e)
    }
}

impl From<FilterParseError> for AppError {
    fn from(e: FilterParseError) -> Self {
        AppError::Filter(e)
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Other(s)
    }
}

// View-facing commands report errors as plain strings.
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}
