//! # Quadratic-Form Portfolio Risk
//!
//! $$
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}, \qquad
//! \Sigma = \operatorname{diag}(\sigma)\,\rho\,\operatorname{diag}(\sigma)
//! $$

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

/// Scalar portfolio risk from a correlation snapshot, a per-asset volatility
/// vector, and an allocation vector.
///
/// All three inputs must share the same positional asset order; no reordering
/// or name matching is performed here. A non-positive-semidefinite
/// correlation matrix can make the quadratic form negative, in which case the
/// result is NaN.
pub fn portfolio_risk(corr: &Array2<f64>, vol: ArrayView1<f64>, ratio: ArrayView1<f64>) -> f64 {
  let n = vol.len();
  let cov = Array2::from_shape_fn((n, n), |(i, j)| vol[i] * vol[j] * corr[[i, j]]);
  let sigma_w: Array1<f64> = cov.dot(&ratio);
  ratio.dot(&sigma_w).sqrt()
}
