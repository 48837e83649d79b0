//! # Allocation Engine
//!
//! $$
//! w_i = \frac{1/\sigma_i}{\sum_j 1/\sigma_j}
//! $$
//!
//! Builds the full-history ratio table: either a fixed vector repeated on
//! every date, or inverse-volatility risk-parity weights recomputed at each
//! reset date and held constant until the next one.

use ndarray::Array2;

use super::schedule::ResetSchedule;
use super::series::AssetSeries;
use crate::error::PortfolioError;

/// Fixed-ratio table: every date carries `ratio_fixed` in asset order.
pub fn fixed_ratio_table(
  n_dates: usize,
  n_assets: usize,
  ratio_fixed: &[f64],
) -> Result<Array2<f64>, PortfolioError> {
  if ratio_fixed.len() != n_assets {
    return Err(PortfolioError::ShapeMismatch(format!(
      "fixed ratio has {} entries for {n_assets} assets",
      ratio_fixed.len()
    )));
  }
  Ok(Array2::from_shape_fn((n_dates, n_assets), |(_, j)| {
    ratio_fixed[j]
  }))
}

/// Risk-parity table: inverse-volatility weights evaluated at each reset
/// date's volatility snapshot, piecewise constant between resets.
///
/// Only the two-asset case is implemented; more assets raise the recoverable
/// [`PortfolioError::UnfinishedFeature`] condition.
pub fn risk_parity_table(
  vol: &AssetSeries,
  schedule: &ResetSchedule,
) -> Result<Array2<f64>, PortfolioError> {
  let n_assets = vol.n_assets();
  if n_assets > 2 {
    return Err(PortfolioError::UnfinishedFeature(
      "risk parity weights for more than 2 assets",
    ));
  }

  let reset_weights: Vec<Vec<f64>> = schedule
    .positions()
    .iter()
    .map(|&pos| {
      let row = vol.row(pos);
      let inv: Vec<f64> = row.iter().map(|&v| 1.0 / v).collect();
      let total: f64 = inv.iter().sum();
      inv.iter().map(|&iv| iv / total).collect()
    })
    .collect();

  Ok(Array2::from_shape_fn(
    (vol.n_dates(), n_assets),
    |(t, j)| reset_weights[schedule.period_of(t)][j],
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::schedule::ShiftMode;
  use approx::assert_relative_eq;
  use chrono::NaiveDate;
  use ndarray::Array2;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn daily_index(from: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = from;
    for _ in 0..n {
      out.push(day);
      day = day.succ_opt().unwrap();
    }
    out
  }

  #[test]
  fn fixed_table_is_constant_and_exact() {
    let table = fixed_ratio_table(5, 2, &[0.7, 0.3]).unwrap();
    for t in 0..5 {
      assert_eq!(table[[t, 0]], 0.7);
      assert_eq!(table[[t, 1]], 0.3);
    }
  }

  #[test]
  fn fixed_table_rejects_wrong_length() {
    assert!(matches!(
      fixed_ratio_table(5, 2, &[1.0]),
      Err(PortfolioError::ShapeMismatch(_))
    ));
  }

  #[test]
  fn risk_parity_weights_are_inverse_vol_at_resets() {
    // Vol regime changes mid-sample; weights only move at the next reset.
    let index = daily_index(d(2020, 1, 1), 90);
    let n = index.len();
    let vol = AssetSeries::new(
      index.clone(),
      vec!["a".to_string(), "b".to_string()],
      Array2::from_shape_fn((n, 2), |(t, j)| {
        if j == 0 {
          0.1
        } else if t < 40 {
          0.3
        } else {
          0.1
        }
      }),
    )
    .unwrap();

    let schedule = ResetSchedule::generate(&index, index[0], 2, ShiftMode::After).unwrap();
    let table = risk_parity_table(&vol, &schedule).unwrap();

    // First period: 1/0.1 vs 1/0.3 -> 0.75 / 0.25.
    assert_relative_eq!(table[[0, 0]], 0.75, epsilon = 1e-12);
    assert_relative_eq!(table[[0, 1]], 0.25, epsilon = 1e-12);
    assert_relative_eq!(table[[39, 0]], 0.75, epsilon = 1e-12);

    // After the reset at 2020-03-01 (row 60) both vols are equal.
    assert_relative_eq!(table[[60, 0]], 0.5, epsilon = 1e-12);
    assert_relative_eq!(table[[n - 1, 1]], 0.5, epsilon = 1e-12);

    for t in 0..n {
      assert_relative_eq!(table[[t, 0]] + table[[t, 1]], 1.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn more_than_two_assets_is_unfinished() {
    let index = daily_index(d(2020, 1, 1), 40);
    let n = index.len();
    let vol = AssetSeries::new(
      index.clone(),
      vec!["a".to_string(), "b".to_string(), "c".to_string()],
      Array2::from_elem((n, 3), 0.2),
    )
    .unwrap();
    let schedule = ResetSchedule::generate(&index, index[0], 1, ShiftMode::After).unwrap();

    assert!(matches!(
      risk_parity_table(&vol, &schedule),
      Err(PortfolioError::UnfinishedFeature(_))
    ));
  }
}
