//! # Errors
//!
//! Error taxonomy for portfolio construction. Every fatal variant aborts the
//! whole build and leaves no partial portfolio behind; [`PortfolioError::UnfinishedFeature`]
//! is the one recoverable condition: callers may catch it and fall back to a
//! supported configuration.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while validating inputs or constructing a portfolio.
#[derive(Debug, Error)]
pub enum PortfolioError {
  /// A required input (or a conditionally required one) is absent.
  #[error("missing required input: {0}")]
  MissingInput(&'static str),

  /// A configuration value is present but unusable.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Input tables disagree on length, column set, or date index.
  #[error("shape mismatch: {0}")]
  ShapeMismatch(String),

  /// A date string could not be parsed.
  #[error("invalid date value: {0}")]
  InvalidDate(String),

  /// Two dates violate the required ordering.
  #[error("date ordering violation: {0}")]
  DateOrder(String),

  /// A requested feature exists but is not implemented yet. Recoverable:
  /// callers may substitute a supported configuration.
  #[error("unfinished feature: {0}")]
  UnfinishedFeature(&'static str),

  /// The cumulative levered loss reached -100% on some date; the chosen
  /// leverage must be reduced or capped.
  #[error("portfolio out of money on {date}: cumulative levered return {value}")]
  OutOfMoney { date: NaiveDate, value: f64 },
}
