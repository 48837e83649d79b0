//! # Drift Tracker
//!
//! Between resets the relative value of the assets drifts away from the
//! planned allocation. This module derives the actual (drift-adjusted)
//! weights from the compounding state, the planned portfolio-risk series at
//! reset dates, and the actual portfolio risk recomputed on every trading
//! date.

use ndarray::Array2;

use super::risk::portfolio_risk;
use super::schedule::ResetSchedule;
use super::series::AssetSeries;
use super::series::CorrelationSeries;

/// Drift-adjusted weights per date: `(cum_levered + 1) * planned`, row
/// renormalized to sum 1. A row with any negative component is meaningless
/// for within-period rebalancing and is marked NaN wholesale.
pub fn actual_ratio_table(cum_levered: &Array2<f64>, ratio: &Array2<f64>) -> Array2<f64> {
  let (n_dates, n_assets) = cum_levered.dim();
  let mut out = Array2::zeros((n_dates, n_assets));

  for t in 0..n_dates {
    let mut total = 0.0;
    for i in 0..n_assets {
      let unnorm = (cum_levered[[t, i]] + 1.0) * ratio[[t, i]];
      out[[t, i]] = unnorm;
      total += unnorm;
    }

    let mut negative = false;
    for i in 0..n_assets {
      out[[t, i]] /= total;
      if out[[t, i]] < 0.0 {
        negative = true;
      }
    }
    if negative {
      for i in 0..n_assets {
        out[[t, i]] = f64::NAN;
      }
    }
  }

  out
}

/// Planned portfolio risk: the quadratic form evaluated at each reset date
/// with the planned allocation, held constant until the next reset.
pub fn planned_risk_series(
  corr: &CorrelationSeries,
  vol: &AssetSeries,
  ratio: &Array2<f64>,
  schedule: &ResetSchedule,
) -> Vec<f64> {
  let at_resets: Vec<f64> = schedule
    .positions()
    .iter()
    .map(|&pos| portfolio_risk(corr.snapshot(pos), vol.row(pos), ratio.row(pos)))
    .collect();

  (0..vol.n_dates())
    .map(|t| at_resets[schedule.period_of(t)])
    .collect()
}

/// Actual portfolio risk: the quadratic form with each date's own
/// correlation/volatility snapshot and that date's actual weights. NaN where
/// the actual weights are undefined; unlike the planned series it is
/// recomputed every trading date.
pub fn actual_risk_series(
  corr: &CorrelationSeries,
  vol: &AssetSeries,
  ratio_actual: &Array2<f64>,
) -> Vec<f64> {
  (0..vol.n_dates())
    .map(|t| {
      let row = ratio_actual.row(t);
      if row.iter().any(|w| w.is_nan()) {
        f64::NAN
      } else {
        portfolio_risk(corr.snapshot(t), vol.row(t), row)
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use ndarray::arr2;

  #[test]
  fn actual_weights_renormalize_to_one() {
    let cum = arr2(&[[0.1, -0.05]]);
    let ratio = arr2(&[[0.5, 0.5]]);
    let out = actual_ratio_table(&cum, &ratio);

    let w0 = (0.1 + 1.0) * 0.5;
    let w1 = (-0.05 + 1.0) * 0.5;
    assert_relative_eq!(out[[0, 0]], w0 / (w0 + w1), epsilon = 1e-12);
    assert_relative_eq!(out[[0, 1]], w1 / (w0 + w1), epsilon = 1e-12);
    assert_relative_eq!(out[[0, 0]] + out[[0, 1]], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn negative_component_blanks_the_whole_row() {
    // Second asset's levered loss exceeds its stake: unnormalized weight < 0.
    let cum = arr2(&[[0.4, -1.3], [0.0, 0.0]]);
    let ratio = arr2(&[[0.5, 0.5], [0.5, 0.5]]);
    let out = actual_ratio_table(&cum, &ratio);

    assert!(out[[0, 0]].is_nan());
    assert!(out[[0, 1]].is_nan());
    assert!(!out[[1, 0]].is_nan());
  }

  #[test]
  fn actual_risk_is_nan_where_weights_are_undefined() {
    use crate::portfolio::series::{AssetSeries, CorrelationSeries};
    use chrono::NaiveDate;

    let index = vec![
      NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
      NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
    ];
    let names = vec!["a".to_string(), "b".to_string()];
    let vol = AssetSeries::new(index.clone(), names.clone(), arr2(&[[0.1, 0.2], [0.1, 0.2]]))
      .unwrap();
    let corr = CorrelationSeries::new(
      index,
      names,
      vec![arr2(&[[1.0, 0.0], [0.0, 1.0]]); 2],
    )
    .unwrap();

    let ratio_actual = arr2(&[[f64::NAN, f64::NAN], [0.5, 0.5]]);
    let risk = actual_risk_series(&corr, &vol, &ratio_actual);

    assert!(risk[0].is_nan());
    let expected = ((0.5f64 * 0.1).powi(2) + (0.5f64 * 0.2).powi(2)).sqrt();
    assert_relative_eq!(risk[1], expected, epsilon = 1e-12);
  }
}
