//! # Reset Schedule
//!
//! Calendar arithmetic for rebalancing: whole-month intervals, shift policy
//! for snapping calendar anchors to trading dates, and the resulting reset
//! schedule with its per-date "most recent reset" lookup.

use std::str::FromStr;

use chrono::Datelike;
use chrono::Days;
use chrono::Months;
use chrono::NaiveDate;

use crate::error::PortfolioError;

/// Whole months elapsed between two calendar dates.
///
/// A month counts as elapsed only when the day-of-month of `date2` is at
/// least the day-of-month of `date1`. `date2` must be strictly after `date1`.
pub fn month_interval(date1: NaiveDate, date2: NaiveDate) -> Result<i32, PortfolioError> {
  if date2 <= date1 {
    return Err(PortfolioError::DateOrder(format!(
      "{date2} does not follow {date1}"
    )));
  }
  let months = (date2.year() - date1.year()) * 12 + date2.month() as i32 - date1.month() as i32;
  Ok(months - i32::from(date2.day() < date1.day()))
}

/// Snapping rule for calendar anchors that fall on non-trading days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShiftMode {
  /// Take the earliest trading date on or after the anchor.
  #[default]
  After,
  /// Take the latest trading date on or before the anchor.
  Before,
}

impl FromStr for ShiftMode {
  type Err = PortfolioError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "after" | "a" | "front" | "f" => Ok(Self::After),
      "before" | "back" | "b" => Ok(Self::Before),
      other => Err(PortfolioError::InvalidInput(format!(
        "unknown reset shift mode '{other}'"
      ))),
    }
  }
}

/// The ordered reset dates of a sample, all members of the trading-date
/// index, plus the per-day lookup of the most recent reset.
#[derive(Clone, Debug, PartialEq)]
pub struct ResetSchedule {
  dates: Vec<NaiveDate>,
  positions: Vec<usize>,
  period_of: Vec<usize>,
  sample_month_interval: i32,
  reset_times: usize,
}

impl ResetSchedule {
  /// Generate the schedule over `index` (strictly increasing trading dates).
  ///
  /// Anchors start at `first_reset` and are spaced `reset_months` apart,
  /// each preserving the day-of-month of `first_reset`; every anchor is
  /// snapped to a trading date per `mode`. When the sample starts before
  /// `first_reset`, the first trading date is prepended as an implicit
  /// zeroth reset.
  pub fn generate(
    index: &[NaiveDate],
    first_reset: NaiveDate,
    reset_months: u32,
    mode: ShiftMode,
  ) -> Result<Self, PortfolioError> {
    if reset_months == 0 {
      return Err(PortfolioError::InvalidInput(
        "reset cadence must be a positive number of months".to_string(),
      ));
    }
    let first_day = index[0];
    let last_day = index[index.len() - 1];
    if first_reset < first_day {
      return Err(PortfolioError::DateOrder(format!(
        "first reset date {first_reset} precedes the first trading date {first_day}"
      )));
    }

    let sample_month_interval = month_interval(first_reset, last_day)?;
    let reset_times = (sample_month_interval / reset_months as i32 + 1) as usize;

    let day_shift = u64::from(first_reset.day() - 1);
    let month_start = first_reset
      .checked_sub_days(Days::new(day_shift))
      .ok_or_else(|| PortfolioError::InvalidDate(format!("date arithmetic from {first_reset}")))?;

    let mut positions = Vec::with_capacity(reset_times + 1);
    for k in 0..reset_times {
      let anchor = month_start
        .checked_add_months(Months::new(k as u32 * reset_months))
        .and_then(|d| d.checked_add_days(Days::new(day_shift)))
        .ok_or_else(|| {
          PortfolioError::InvalidDate(format!("date arithmetic from {first_reset}"))
        })?;
      let pos = snap(index, anchor, mode)?;
      // A trading gap longer than the cadence can snap two anchors to the
      // same date; keep the schedule strictly increasing.
      if positions.last() != Some(&pos) {
        positions.push(pos);
      }
    }

    if first_day != first_reset && positions.first() != Some(&0) {
      positions.insert(0, 0);
    }

    let dates: Vec<NaiveDate> = positions.iter().map(|&p| index[p]).collect();

    // Most recent reset for every trading day, as an index into `dates`.
    let mut period_of = Vec::with_capacity(index.len());
    let mut current = 0usize;
    for t in 0..index.len() {
      while current + 1 < positions.len() && positions[current + 1] <= t {
        current += 1;
      }
      period_of.push(current);
    }

    Ok(Self {
      dates,
      positions,
      period_of,
      sample_month_interval,
      reset_times,
    })
  }

  /// Reset dates, including a prepended first trading date when applicable.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Row positions of the reset dates within the trading-date index.
  pub fn positions(&self) -> &[usize] {
    &self.positions
  }

  /// Index into [`Self::dates`] of the most recent reset for row `t`.
  pub fn period_of(&self, t: usize) -> usize {
    self.period_of[t]
  }

  /// Whether row `t` is itself a reset date.
  pub fn is_reset(&self, t: usize) -> bool {
    self.positions[self.period_of[t]] == t
  }

  /// Whole months covered by the sample, from the first reset date.
  pub fn sample_month_interval(&self) -> i32 {
    self.sample_month_interval
  }

  /// Number of generated calendar anchors (excludes the prepended first day).
  pub fn reset_times(&self) -> usize {
    self.reset_times
  }
}

fn snap(index: &[NaiveDate], anchor: NaiveDate, mode: ShiftMode) -> Result<usize, PortfolioError> {
  match mode {
    ShiftMode::After => {
      let pos = index.partition_point(|d| *d < anchor);
      if pos == index.len() {
        return Err(PortfolioError::DateOrder(format!(
          "no trading date on or after reset anchor {anchor}"
        )));
      }
      Ok(pos)
    }
    ShiftMode::Before => {
      let pos = index.partition_point(|d| *d <= anchor);
      if pos == 0 {
        return Err(PortfolioError::DateOrder(format!(
          "no trading date on or before reset anchor {anchor}"
        )));
      }
      Ok(pos - 1)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Weekday;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn weekdays(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
      if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        out.push(day);
      }
      day = day.succ_opt().unwrap();
    }
    out
  }

  #[test]
  fn month_interval_matches_calendar_truth() {
    let base = d(2011, 1, 5);
    assert_eq!(month_interval(base, d(2012, 1, 4)).unwrap(), 11);
    assert_eq!(month_interval(base, d(2012, 1, 5)).unwrap(), 12);
    assert_eq!(month_interval(base, d(2012, 1, 6)).unwrap(), 12);
  }

  #[test]
  fn month_interval_is_monotonic_in_second_argument() {
    let base = d(2011, 1, 5);
    let mut prev = i32::MIN;
    let mut day = d(2011, 1, 6);
    while day <= d(2013, 3, 1) {
      let m = month_interval(base, day).unwrap();
      assert!(m >= prev);
      prev = m;
      day = day.succ_opt().unwrap();
    }
  }

  #[test]
  fn month_interval_rejects_out_of_order_dates() {
    assert!(matches!(
      month_interval(d(2012, 1, 5), d(2011, 1, 5)),
      Err(PortfolioError::DateOrder(_))
    ));
    assert!(matches!(
      month_interval(d(2012, 1, 5), d(2012, 1, 5)),
      Err(PortfolioError::DateOrder(_))
    ));
  }

  #[test]
  fn shift_mode_parses_all_aliases() {
    for s in ["after", "a", "front", "f", "After"] {
      assert_eq!(s.parse::<ShiftMode>().unwrap(), ShiftMode::After);
    }
    for s in ["before", "back", "b"] {
      assert_eq!(s.parse::<ShiftMode>().unwrap(), ShiftMode::Before);
    }
    assert!(matches!(
      "sideways".parse::<ShiftMode>(),
      Err(PortfolioError::InvalidInput(_))
    ));
  }

  #[test]
  fn schedule_length_and_prepend() {
    // Full daily calendar so every anchor is a trading date.
    let index: Vec<NaiveDate> = {
      let mut out = Vec::new();
      let mut day = d(2011, 1, 1);
      while day <= d(2011, 12, 31) {
        out.push(day);
        day = day.succ_opt().unwrap();
      }
      out
    };

    let schedule = ResetSchedule::generate(&index, d(2011, 1, 5), 3, ShiftMode::After).unwrap();

    assert_eq!(schedule.sample_month_interval(), 11);
    assert_eq!(schedule.reset_times(), 4);
    assert_eq!(
      schedule.dates(),
      &[
        d(2011, 1, 1),
        d(2011, 1, 5),
        d(2011, 4, 5),
        d(2011, 7, 5),
        d(2011, 10, 5)
      ]
    );
  }

  #[test]
  fn anchors_snap_across_weekends() {
    let index = weekdays(d(2011, 1, 3), d(2011, 12, 30));
    // 2011-06-05 is a Sunday.
    let after = ResetSchedule::generate(&index, d(2011, 3, 5), 3, ShiftMode::After).unwrap();
    assert!(after.dates().contains(&d(2011, 6, 6)));

    let before = ResetSchedule::generate(&index, d(2011, 3, 5), 3, ShiftMode::Before).unwrap();
    assert!(before.dates().contains(&d(2011, 6, 3)));
  }

  #[test]
  fn first_reset_equal_to_first_day_is_not_duplicated() {
    let index = weekdays(d(2011, 1, 3), d(2011, 12, 30));
    let schedule = ResetSchedule::generate(&index, d(2011, 1, 3), 6, ShiftMode::After).unwrap();
    assert_eq!(schedule.dates()[0], d(2011, 1, 3));
    assert!(schedule.dates().windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn trading_gap_longer_than_cadence_does_not_duplicate_resets() {
    // No trading dates between 2011-01-10 and 2011-05-01: the Feb, Mar, and
    // Apr anchors all snap forward to the same day.
    let mut index: Vec<NaiveDate> = Vec::new();
    let mut day = d(2011, 1, 1);
    while day <= d(2011, 1, 10) {
      index.push(day);
      day = day.succ_opt().unwrap();
    }
    let mut day = d(2011, 5, 1);
    while day <= d(2011, 6, 30) {
      index.push(day);
      day = day.succ_opt().unwrap();
    }

    let schedule = ResetSchedule::generate(&index, d(2011, 1, 5), 1, ShiftMode::After).unwrap();

    assert!(schedule.dates().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(
      schedule
        .dates()
        .iter()
        .filter(|&&date| date == d(2011, 5, 1))
        .count(),
      1
    );
    assert_eq!(
      schedule.dates(),
      &[
        d(2011, 1, 1),
        d(2011, 1, 5),
        d(2011, 5, 1),
        d(2011, 5, 5),
        d(2011, 6, 5)
      ]
    );
  }

  #[test]
  fn first_reset_before_sample_start_fails() {
    let index = weekdays(d(2011, 1, 3), d(2011, 12, 30));
    assert!(matches!(
      ResetSchedule::generate(&index, d(2010, 12, 1), 6, ShiftMode::After),
      Err(PortfolioError::DateOrder(_))
    ));
  }

  #[test]
  fn period_lookup_is_piecewise_constant() {
    let index = weekdays(d(2011, 1, 3), d(2011, 12, 30));
    let schedule = ResetSchedule::generate(&index, d(2011, 1, 5), 6, ShiftMode::After).unwrap();

    for t in 0..index.len() {
      let period = schedule.period_of(t);
      assert!(schedule.dates()[period] <= index[t]);
      if period + 1 < schedule.dates().len() {
        assert!(index[t] < schedule.dates()[period + 1]);
      }
      assert_eq!(schedule.is_reset(t), schedule.dates().contains(&index[t]));
    }
  }
}
