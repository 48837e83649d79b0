//! # Compounding Engine
//!
//! $$
//! r_p(t) = \ln\Big(1 + L_t \sum_i w_{i,t}\,(e^{c_{i,t}} - 1)\Big)
//! $$
//!
//! Compounds per-asset log returns within each reset interval into the
//! levered portfolio log-return series. `c_{i,t}` is the per-asset
//! cumulative log return since the most recent reset; the accumulator is
//! reset to zero exactly at each reset boundary.

use ndarray::Array2;
use tracing::debug;

use super::schedule::ResetSchedule;
use super::series::AssetSeries;
use crate::error::PortfolioError;

/// Compounding output: the portfolio log-return series and the intermediate
/// cumulative state the drift tracker consumes.
#[derive(Clone, Debug)]
pub struct Compounded {
  /// One-period portfolio log return per date. On reset dates (including the
  /// first date) the value is the within-period cumulative figure itself.
  pub logr_p: Vec<f64>,
  /// Per-date, per-asset cumulative levered simple return within the current
  /// reset period: `(e^{c_{i,t}} - 1) * w_{i,t} * L_t`.
  pub cum_levered: Array2<f64>,
}

/// Run the compounding pass.
///
/// Fails with [`PortfolioError::OutOfMoney`] on the first date whose
/// cumulative levered simple return reaches -100%.
pub fn compound(
  logr: &AssetSeries,
  ratio: &Array2<f64>,
  leverage: &[f64],
  schedule: &ResetSchedule,
) -> Result<Compounded, PortfolioError> {
  let n_dates = logr.n_dates();
  let n_assets = logr.n_assets();

  let mut acc = vec![0.0f64; n_assets];
  let mut cum_levered = Array2::zeros((n_dates, n_assets));
  let mut logr_p = Vec::with_capacity(n_dates);
  let mut prev_cum_log = 0.0f64;

  for t in 0..n_dates {
    let at_reset = schedule.is_reset(t);
    if at_reset {
      acc.iter_mut().for_each(|a| *a = 0.0);
    }

    let mut total = 0.0;
    for i in 0..n_assets {
      acc[i] += logr.values()[[t, i]];
      let levered = (acc[i].exp() - 1.0) * ratio[[t, i]] * leverage[t];
      cum_levered[[t, i]] = levered;
      total += levered;
    }

    if total <= -1.0 {
      return Err(PortfolioError::OutOfMoney {
        date: logr.index()[t],
        value: total,
      });
    }

    let cum_log = (total + 1.0).ln();
    logr_p.push(if at_reset {
      cum_log
    } else {
      cum_log - prev_cum_log
    });
    prev_cum_log = cum_log;
  }

  debug!(
    periods = schedule.dates().len(),
    dates = n_dates,
    "compounded portfolio returns"
  );

  Ok(Compounded { logr_p, cum_levered })
}
