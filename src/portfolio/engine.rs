//! # Portfolio Controller
//!
//! $$
//! \text{config} \longrightarrow \text{schedule} \rightarrow \mathbf{w}
//! \rightarrow L \rightarrow r_p
//! $$
//!
//! Orchestrates schedule generation, allocation, leverage, compounding, and
//! the optional drift outputs from one validated configuration. Construction
//! is atomic: it returns a fully-built [`Portfolio`] or an error, never a
//! partial object. Every mutator rebuilds the whole output set from a fresh
//! configuration value.

use std::fmt::Display;

use chrono::NaiveDate;
use ndarray::Array2;
use tracing::debug;

use super::allocation::fixed_ratio_table;
use super::allocation::risk_parity_table;
use super::compound::compound;
use super::drift::actual_ratio_table;
use super::drift::actual_risk_series;
use super::drift::planned_risk_series;
use super::leverage::leverage_series;
use super::schedule::ResetSchedule;
use super::schedule::ShiftMode;
use super::series::AssetSeries;
use super::series::CorrelationSeries;
use crate::error::PortfolioError;

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate, PortfolioError> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| PortfolioError::InvalidDate(s.to_string()))
}

/// Full configuration of a portfolio run.
///
/// `logr` and `reset_months` are always required. A supplied `ratio_fixed`
/// selects the fixed-ratio allocation mode; otherwise inverse-volatility
/// risk parity is used and `vol` becomes required. `corr` and `vol` are
/// required whenever `target_risk` is set or actual-value outputs are
/// requested. `leverage_fixed` takes priority over `target_risk`.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioConfig {
  /// Per-asset log returns, the primary series.
  pub logr: AssetSeries,
  /// Months between two reset dates.
  pub reset_months: u32,
  /// Fixed per-asset weights, in asset order. Selects fixed-ratio mode.
  pub ratio_fixed: Option<Vec<f64>>,
  /// Per-asset volatility, aligned with `logr`.
  pub vol: Option<AssetSeries>,
  /// Per-date correlation snapshots, aligned with `logr`.
  pub corr: Option<CorrelationSeries>,
  /// First reset date; defaults to the first sample date.
  pub first_reset_date: Option<NaiveDate>,
  /// Snapping rule for reset anchors on non-trading days.
  pub shift_mode: ShiftMode,
  /// Desired portfolio risk; drives the leverage solve at each reset.
  pub target_risk: Option<f64>,
  /// Constant leverage overriding the leverage engine.
  pub leverage_fixed: Option<f64>,
  /// One-sided leverage ceiling.
  pub leverage_limit: Option<f64>,
  /// Also compute the drift-adjusted actual ratio and risk outputs.
  pub compute_actual: bool,
}

impl PortfolioConfig {
  /// Configuration with the required inputs and every option unset.
  pub fn new(logr: AssetSeries, reset_months: u32) -> Self {
    Self {
      logr,
      reset_months,
      ratio_fixed: None,
      vol: None,
      corr: None,
      first_reset_date: None,
      shift_mode: ShiftMode::default(),
      target_risk: None,
      leverage_fixed: None,
      leverage_limit: None,
      compute_actual: false,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
struct Outputs {
  sample_month_interval: i32,
  reset_times: usize,
  reset_dates: Vec<NaiveDate>,
  logr_p: Vec<f64>,
  ratio: Array2<f64>,
  ratio_actual: Option<Array2<f64>>,
  risk_p: Option<Vec<f64>>,
  risk_p_actual: Option<Vec<f64>>,
  leverage: Vec<f64>,
}

fn validate(config: &PortfolioConfig) -> Result<(), PortfolioError> {
  let logr = &config.logr;
  if logr.n_assets() < 2 {
    return Err(PortfolioError::ShapeMismatch(
      "log returns must cover at least 2 assets".to_string(),
    ));
  }
  if config.reset_months == 0 {
    return Err(PortfolioError::InvalidInput(
      "reset cadence must be a positive number of months".to_string(),
    ));
  }

  if let Some(vol) = &config.vol {
    if vol.n_dates() != logr.n_dates() {
      return Err(PortfolioError::ShapeMismatch(format!(
        "log returns cover {} dates, volatility {}",
        logr.n_dates(),
        vol.n_dates()
      )));
    }
    if !vol.aligned_with(logr) {
      return Err(PortfolioError::ShapeMismatch(
        "volatility index/columns differ from log returns".to_string(),
      ));
    }
  }

  if let Some(ratio_fixed) = &config.ratio_fixed {
    if ratio_fixed.len() != logr.n_assets() {
      return Err(PortfolioError::ShapeMismatch(format!(
        "fixed ratio has {} entries for {} assets",
        ratio_fixed.len(),
        logr.n_assets()
      )));
    }
  } else if config.vol.is_none() {
    return Err(PortfolioError::MissingInput(
      "risk (volatility) is required for risk parity allocation",
    ));
  }

  let needs_risk_inputs = config.target_risk.is_some() || config.compute_actual;
  if needs_risk_inputs {
    if config.vol.is_none() {
      return Err(PortfolioError::MissingInput(
        "risk (volatility) is required by target_risk / actual outputs",
      ));
    }
    if config.corr.is_none() {
      return Err(PortfolioError::MissingInput(
        "corr is required by target_risk / actual outputs",
      ));
    }
  }

  if let Some(corr) = &config.corr {
    if !corr.aligned_with(logr) {
      return Err(PortfolioError::ShapeMismatch(
        "correlation index/names differ from log returns".to_string(),
      ));
    }
  }

  Ok(())
}

fn rebuild(config: &PortfolioConfig) -> Result<Outputs, PortfolioError> {
  validate(config)?;

  let index = config.logr.index();
  let n_dates = config.logr.n_dates();
  let n_assets = config.logr.n_assets();
  let first_reset = config.first_reset_date.unwrap_or(index[0]);

  let schedule = ResetSchedule::generate(index, first_reset, config.reset_months, config.shift_mode)?;
  debug!(
    resets = schedule.dates().len(),
    months = schedule.sample_month_interval(),
    "generated reset schedule"
  );

  let ratio = match &config.ratio_fixed {
    Some(fixed) => fixed_ratio_table(n_dates, n_assets, fixed)?,
    None => {
      let vol = config
        .vol
        .as_ref()
        .ok_or(PortfolioError::MissingInput("risk (volatility)"))?;
      risk_parity_table(vol, &schedule)?
    }
  };

  let leverage = leverage_series(
    config.leverage_fixed,
    config.target_risk,
    config.leverage_limit,
    config.corr.as_ref(),
    config.vol.as_ref(),
    &ratio,
    &schedule,
    n_dates,
  )?;

  let compounded = compound(&config.logr, &ratio, &leverage, &schedule)?;

  let risk_p = match (&config.corr, &config.vol) {
    (Some(corr), Some(vol)) => Some(planned_risk_series(corr, vol, &ratio, &schedule)),
    _ => None,
  };

  let (ratio_actual, risk_p_actual) = if config.compute_actual {
    // Validation guarantees both inputs here.
    let corr = config
      .corr
      .as_ref()
      .ok_or(PortfolioError::MissingInput("corr"))?;
    let vol = config
      .vol
      .as_ref()
      .ok_or(PortfolioError::MissingInput("risk (volatility)"))?;
    let ratio_actual = actual_ratio_table(&compounded.cum_levered, &ratio);
    let risk_p_actual = actual_risk_series(corr, vol, &ratio_actual);
    (Some(ratio_actual), Some(risk_p_actual))
  } else {
    (None, None)
  };

  debug!(dates = n_dates, assets = n_assets, "portfolio construction finished");

  Ok(Outputs {
    sample_month_interval: schedule.sample_month_interval(),
    reset_times: schedule.reset_times(),
    reset_dates: schedule.dates().to_vec(),
    logr_p: compounded.logr_p,
    ratio,
    ratio_actual,
    risk_p,
    risk_p_actual,
    leverage,
  })
}

/// A fully-constructed rebalanced portfolio and its derived series.
///
/// All outputs are recomputed wholesale by every `set_*` mutator; a failed
/// mutation leaves the previous state untouched.
#[derive(Clone, Debug)]
pub struct Portfolio {
  config: PortfolioConfig,
  out: Outputs,
}

impl Portfolio {
  /// Validate `config` and run the whole pipeline.
  pub fn new(config: PortfolioConfig) -> Result<Self, PortfolioError> {
    let out = rebuild(&config)?;
    Ok(Self { config, out })
  }

  /// Borrow the active configuration.
  pub fn config(&self) -> &PortfolioConfig {
    &self.config
  }

  /// Trading-date index shared by all output series.
  pub fn index(&self) -> &[NaiveDate] {
    self.config.logr.index()
  }

  /// Ordered asset names.
  pub fn names(&self) -> &[String] {
    self.config.logr.names()
  }

  /// Whole months in the sample, from the first reset date.
  pub fn sample_month_interval(&self) -> i32 {
    self.out.sample_month_interval
  }

  /// Number of generated reset anchors.
  pub fn reset_times(&self) -> usize {
    self.out.reset_times
  }

  /// Actual reset dates (with the first trading date prepended when it
  /// differs from the configured first reset date).
  pub fn reset_dates(&self) -> &[NaiveDate] {
    &self.out.reset_dates
  }

  /// Portfolio log-return series.
  pub fn logr_p(&self) -> &[f64] {
    &self.out.logr_p
  }

  /// Planned per-date, per-asset allocation weights.
  pub fn ratio(&self) -> &Array2<f64> {
    &self.out.ratio
  }

  /// Drift-adjusted weights; `None` unless actual outputs were requested.
  /// Rows with a negative component are NaN.
  pub fn ratio_actual(&self) -> Option<&Array2<f64>> {
    self.out.ratio_actual.as_ref()
  }

  /// Planned portfolio risk, piecewise constant between resets; `None` when
  /// correlation/volatility inputs are absent.
  pub fn risk_p(&self) -> Option<&[f64]> {
    self.out.risk_p.as_deref()
  }

  /// Realized portfolio risk from the drifted weights, recomputed each
  /// trading date; `None` unless actual outputs were requested.
  pub fn risk_p_actual(&self) -> Option<&[f64]> {
    self.out.risk_p_actual.as_deref()
  }

  /// Per-date leverage series.
  pub fn leverage(&self) -> &[f64] {
    &self.out.leverage
  }

  fn reconfigure(
    &mut self,
    mutate: impl FnOnce(&mut PortfolioConfig),
  ) -> Result<(), PortfolioError> {
    let mut config = self.config.clone();
    mutate(&mut config);
    let out = rebuild(&config)?;
    self.config = config;
    self.out = out;
    Ok(())
  }

  /// Replace the fixed ratio vector and rebuild.
  pub fn set_ratio_fixed(&mut self, change: Option<Vec<f64>>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.ratio_fixed = change)
  }

  /// Replace the log-return table and rebuild.
  pub fn set_logr(&mut self, change: AssetSeries) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.logr = change)
  }

  /// Replace the volatility table and rebuild.
  pub fn set_vol(&mut self, change: Option<AssetSeries>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.vol = change)
  }

  /// Replace the correlation snapshots and rebuild.
  pub fn set_corr(&mut self, change: Option<CorrelationSeries>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.corr = change)
  }

  /// Replace the first reset date and rebuild.
  pub fn set_first_reset_date(&mut self, change: Option<NaiveDate>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.first_reset_date = change)
  }

  /// Replace the first reset date from a `YYYY-MM-DD` string and rebuild.
  pub fn set_first_reset_date_str(&mut self, change: &str) -> Result<(), PortfolioError> {
    let date = parse_date(change)?;
    self.set_first_reset_date(Some(date))
  }

  /// Replace the reset cadence and rebuild.
  pub fn set_reset_months(&mut self, change: u32) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.reset_months = change)
  }

  /// Replace the shift mode and rebuild.
  pub fn set_shift_mode(&mut self, change: ShiftMode) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.shift_mode = change)
  }

  /// Replace the target risk and rebuild.
  pub fn set_target_risk(&mut self, change: Option<f64>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.target_risk = change)
  }

  /// Replace the fixed leverage and rebuild.
  pub fn set_leverage_fixed(&mut self, change: Option<f64>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.leverage_fixed = change)
  }

  /// Replace the leverage cap and rebuild.
  pub fn set_leverage_limit(&mut self, change: Option<f64>) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.leverage_limit = change)
  }

  /// Toggle the actual-value outputs and rebuild.
  pub fn set_compute_actual(&mut self, change: bool) -> Result<(), PortfolioError> {
    self.reconfigure(|c| c.compute_actual = change)
  }
}

impl Display for Portfolio {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "rebalanced portfolio over {} trading dates", self.index().len())?;
    writeln!(f, "  sample_month_interval: {}", self.out.sample_month_interval)?;
    writeln!(f, "  reset_times: {}", self.out.reset_times)?;
    writeln!(f, "  reset_dates: {} entries", self.out.reset_dates.len())?;
    writeln!(f, "  outputs: logr_p, ratio, leverage")?;
    write!(
      f,
      "  actual outputs: {}",
      if self.config.compute_actual {
        "ratio_actual, risk_p, risk_p_actual"
      } else {
        "not requested"
      }
    )
  }
}
