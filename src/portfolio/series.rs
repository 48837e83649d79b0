//! # Date-Indexed Series
//!
//! Owned, validated containers for the input time series: per-asset tables
//! (log returns, volatility) and per-date correlation snapshots. All tables
//! share a strictly increasing date index with one entry per trading day.

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;

use crate::error::PortfolioError;

fn check_strictly_increasing(index: &[NaiveDate]) -> Result<(), PortfolioError> {
  for pair in index.windows(2) {
    if pair[1] <= pair[0] {
      return Err(PortfolioError::DateOrder(format!(
        "date index is not strictly increasing at {} -> {}",
        pair[0], pair[1]
      )));
    }
  }
  Ok(())
}

/// A per-asset, date-indexed table with rows ordered by trading date and
/// columns ordered by asset name.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSeries {
  index: Vec<NaiveDate>,
  names: Vec<String>,
  values: Array2<f64>,
}

impl AssetSeries {
  /// Build a validated table; `values` must be `index.len() x names.len()`
  /// and the index strictly increasing.
  pub fn new(
    index: Vec<NaiveDate>,
    names: Vec<String>,
    values: Array2<f64>,
  ) -> Result<Self, PortfolioError> {
    if index.is_empty() {
      return Err(PortfolioError::ShapeMismatch(
        "date index is empty".to_string(),
      ));
    }
    if values.nrows() != index.len() || values.ncols() != names.len() {
      return Err(PortfolioError::ShapeMismatch(format!(
        "values are {}x{}, expected {}x{}",
        values.nrows(),
        values.ncols(),
        index.len(),
        names.len()
      )));
    }
    check_strictly_increasing(&index)?;

    Ok(Self {
      index,
      names,
      values,
    })
  }

  /// Trading-date index.
  pub fn index(&self) -> &[NaiveDate] {
    &self.index
  }

  /// Ordered asset names.
  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// Full value table, rows = dates, cols = assets.
  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  /// One date's row, by row position.
  pub fn row(&self, pos: usize) -> ArrayView1<'_, f64> {
    self.values.row(pos)
  }

  pub fn n_dates(&self) -> usize {
    self.index.len()
  }

  pub fn n_assets(&self) -> usize {
    self.names.len()
  }

  /// True when `other` has the identical date index and identical,
  /// same-order column set.
  pub fn aligned_with(&self, other: &AssetSeries) -> bool {
    self.index == other.index && self.names == other.names
  }
}

/// One symmetric correlation matrix per trading date, asset order matching
/// the paired [`AssetSeries`]. Symmetry and unit diagonal are the caller's
/// responsibility; only the dimensions are checked.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationSeries {
  index: Vec<NaiveDate>,
  names: Vec<String>,
  matrices: Vec<Array2<f64>>,
}

impl CorrelationSeries {
  pub fn new(
    index: Vec<NaiveDate>,
    names: Vec<String>,
    matrices: Vec<Array2<f64>>,
  ) -> Result<Self, PortfolioError> {
    if matrices.len() != index.len() {
      return Err(PortfolioError::ShapeMismatch(format!(
        "{} correlation matrices for {} dates",
        matrices.len(),
        index.len()
      )));
    }
    let n = names.len();
    if let Some(bad) = matrices.iter().find(|m| m.nrows() != n || m.ncols() != n) {
      return Err(PortfolioError::ShapeMismatch(format!(
        "correlation matrix is {}x{}, expected {n}x{n}",
        bad.nrows(),
        bad.ncols()
      )));
    }
    check_strictly_increasing(&index)?;

    Ok(Self {
      index,
      names,
      matrices,
    })
  }

  pub fn index(&self) -> &[NaiveDate] {
    &self.index
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// The correlation snapshot for a row position.
  pub fn snapshot(&self, pos: usize) -> &Array2<f64> {
    &self.matrices[pos]
  }

  /// True when the snapshots line up with `series` by date and asset name.
  pub fn aligned_with(&self, series: &AssetSeries) -> bool {
    self.index == series.index() && self.names == series.names()
  }
}
