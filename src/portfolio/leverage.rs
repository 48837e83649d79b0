//! # Leverage Engine
//!
//! $$
//! L = \frac{\sigma_\text{target}}{\sigma_p}
//! $$
//!
//! Produces the per-date leverage series: a fixed value, a target-risk solve
//! at each reset date, or a constant 1.0, then an optional one-sided cap.

use ndarray::Array2;

use super::risk::portfolio_risk;
use super::schedule::ResetSchedule;
use super::series::AssetSeries;
use super::series::CorrelationSeries;
use crate::error::PortfolioError;

/// Per-date leverage for the whole sample.
///
/// Mode priority: `leverage_fixed` > `target_risk` > unlevered 1.0. In
/// target-risk mode the solve uses each reset date's correlation/volatility
/// snapshot with that date's planned allocation, held constant until the
/// next reset. A configured `leverage_limit` clips from above only.
pub fn leverage_series(
  leverage_fixed: Option<f64>,
  target_risk: Option<f64>,
  leverage_limit: Option<f64>,
  corr: Option<&CorrelationSeries>,
  vol: Option<&AssetSeries>,
  ratio: &Array2<f64>,
  schedule: &ResetSchedule,
  n_dates: usize,
) -> Result<Vec<f64>, PortfolioError> {
  let mut leverage = if let Some(fixed) = leverage_fixed {
    vec![fixed; n_dates]
  } else if let Some(target) = target_risk {
    let corr = corr.ok_or(PortfolioError::MissingInput(
      "corr (required by target_risk)",
    ))?;
    let vol = vol.ok_or(PortfolioError::MissingInput(
      "risk (required by target_risk)",
    ))?;

    let at_resets: Vec<f64> = schedule
      .positions()
      .iter()
      .map(|&pos| target / portfolio_risk(corr.snapshot(pos), vol.row(pos), ratio.row(pos)))
      .collect();
    (0..n_dates).map(|t| at_resets[schedule.period_of(t)]).collect()
  } else {
    vec![1.0; n_dates]
  };

  if let Some(limit) = leverage_limit {
    for value in &mut leverage {
      if *value > limit {
        *value = limit;
      }
    }
  }

  Ok(leverage)
}
