//! # rebalance-rs
//!
//! A library for backtesting periodically-rebalanced multi-asset portfolios.
//! Given per-asset log-return, volatility, and correlation time series, it
//! derives the realized portfolio log-return and risk series under a
//! configurable rebalancing cadence, allocation scheme (fixed ratio or
//! two-asset inverse-volatility risk parity), and leverage policy (fixed,
//! target-risk, capped).
//!
//! ## Example
//!
//! ```rust
//! use rebalance_rs::portfolio::{Portfolio, PortfolioConfig};
//!
//! # fn run(logr: rebalance_rs::portfolio::AssetSeries) -> Result<(), rebalance_rs::PortfolioError> {
//! let mut config = PortfolioConfig::new(logr, 6);
//! config.ratio_fixed = Some(vec![0.6, 0.4]);
//! config.leverage_fixed = Some(1.5);
//! config.leverage_limit = Some(2.0);
//!
//! let portfolio = Portfolio::new(config)?;
//! let _returns = portfolio.logr_p();
//! # Ok(())
//! # }
//! ```
//!
//! Construction is a single atomic batch computation: [`portfolio::Portfolio::new`]
//! either yields a fully-built value or fails with a [`PortfolioError`].
//! Reconfiguration mutators rebuild every output table wholesale; instances
//! are not thread-safe and parallel scenario runs should build independent
//! instances.

pub mod error;
pub mod portfolio;

pub use error::PortfolioError;
