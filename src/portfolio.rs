//! # Rebalanced Portfolio Construction
//!
//! $$
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Simulation of a periodically-rebalanced multi-asset portfolio: reset
//! schedule generation, fixed-ratio or inverse-volatility allocation,
//! fixed/target-risk leverage, within-period compounding of log returns, and
//! drift-adjusted actual weights and risk.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`series`] | Date-indexed input tables (log returns, volatility, correlation). |
//! | [`risk`] | Quadratic-form portfolio risk. |
//! | [`schedule`] | Month arithmetic, shift policy, reset schedule. |
//! | [`allocation`] | Fixed-ratio and risk-parity ratio tables. |
//! | [`leverage`] | Fixed, target-risk, or unlevered leverage series with cap. |
//! | [`compound`] | Within-period compounding into portfolio log returns. |
//! | [`drift`] | Actual (drift-adjusted) weights and realized risk. |
//! | [`engine`] | Configuration, validation, and the [`Portfolio`] controller. |

pub mod allocation;
pub mod compound;
pub mod drift;
pub mod engine;
pub mod leverage;
pub mod risk;
pub mod schedule;
pub mod series;

pub use allocation::fixed_ratio_table;
pub use allocation::risk_parity_table;
pub use compound::compound;
pub use compound::Compounded;
pub use drift::actual_ratio_table;
pub use drift::actual_risk_series;
pub use drift::planned_risk_series;
pub use engine::parse_date;
pub use engine::Portfolio;
pub use engine::PortfolioConfig;
pub use leverage::leverage_series;
pub use risk::portfolio_risk;
pub use schedule::month_interval;
pub use schedule::ResetSchedule;
pub use schedule::ShiftMode;
pub use series::AssetSeries;
pub use series::CorrelationSeries;
