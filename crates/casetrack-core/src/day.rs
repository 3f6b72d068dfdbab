//! Day — one date's cumulative counts for one area.
//!
//! All four counts are cumulative-to-date, not single-day deltas. Days are
//! value types; a series owns its days and keeps them densely dated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result, epoch};

/// The four tracked metrics. The string forms (`deaths`, `confirmed`, …)
/// are used to pick a metric from feed file names.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize,
  Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Metric {
  Deaths,
  Confirmed,
  Recovered,
  Tested,
}

impl Metric {
  pub const ALL: [Metric; 4] =
    [Metric::Deaths, Metric::Confirmed, Metric::Recovered, Metric::Tested];
}

/// Cumulative counts for one area on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
  pub date:      NaiveDate,
  pub deaths:    u64,
  pub confirmed: u64,
  pub recovered: u64,
  pub tested:    u64,
}

impl Default for Day {
  fn default() -> Self {
    Self::new(epoch())
  }
}

impl Day {
  pub fn new(date: NaiveDate) -> Self {
    Self {
      date,
      deaths: 0,
      confirmed: 0,
      recovered: 0,
      tested: 0,
    }
  }

  /// True when all four counts are zero — such days are omitted from the
  /// persisted sparse format.
  pub fn is_empty(&self) -> bool {
    self.deaths + self.confirmed + self.recovered + self.tested == 0
  }

  pub fn get(&self, metric: Metric) -> u64 {
    match metric {
      Metric::Deaths => self.deaths,
      Metric::Confirmed => self.confirmed,
      Metric::Recovered => self.recovered,
      Metric::Tested => self.tested,
    }
  }

  /// Overwrite one metric.
  pub fn set(&mut self, metric: Metric, value: u64) {
    match metric {
      Metric::Deaths => self.deaths = value,
      Metric::Confirmed => self.confirmed = value,
      Metric::Recovered => self.recovered = value,
      Metric::Tested => self.tested = value,
    }
  }

  /// Overwrite all four counts, leaving the date untouched.
  pub fn set_all(
    &mut self,
    deaths: u64,
    confirmed: u64,
    recovered: u64,
    tested: u64,
  ) {
    self.deaths = deaths;
    self.confirmed = confirmed;
    self.recovered = recovered;
    self.tested = tested;
  }

  /// Add to one metric — used when two feeds covering disjoint parts of
  /// the same area must be summed.
  pub fn merge(&mut self, metric: Metric, value: u64) {
    match metric {
      Metric::Deaths => self.deaths += value,
      Metric::Confirmed => self.confirmed += value,
      Metric::Recovered => self.recovered += value,
      Metric::Tested => self.tested += value,
    }
  }

  /// Add all counts from `other` into this day. The dates must match
  /// exactly; anything else means the caller's alignment is broken.
  pub fn merge_day(&mut self, other: &Day) -> Result<()> {
    if self.date != other.date {
      return Err(Error::DateMismatch {
        expected: self.date,
        found:    other.date,
      });
    }
    self.deaths += other.deaths;
    self.confirmed += other.confirmed;
    self.recovered += other.recovered;
    self.tested += other.tested;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
  }

  #[test]
  fn empty_day_has_all_zero_counts() {
    let day = Day::new(date("2020-01-22"));
    assert!(day.is_empty());
  }

  #[test]
  fn set_and_merge_single_metric() {
    let mut day = Day::new(date("2020-02-01"));
    day.set(Metric::Deaths, 5);
    day.merge(Metric::Deaths, 3);
    assert_eq!(day.deaths, 8);
    assert!(!day.is_empty());
  }

  #[test]
  fn merge_day_sums_every_metric() {
    let mut a = Day::new(date("2020-02-01"));
    a.set_all(1, 10, 2, 100);
    let mut b = Day::new(date("2020-02-01"));
    b.set_all(4, 20, 3, 50);
    a.merge_day(&b).unwrap();
    assert_eq!((a.deaths, a.confirmed, a.recovered, a.tested), (5, 30, 5, 150));
  }

  #[test]
  fn merge_day_rejects_unequal_dates() {
    let mut a = Day::new(date("2020-02-01"));
    let b = Day::new(date("2020-02-02"));
    let err = a.merge_day(&b).unwrap_err();
    assert!(matches!(err, Error::DateMismatch { .. }));
  }

  #[test]
  fn metric_parses_from_file_name_fragment() {
    assert_eq!(Metric::from_str("deaths").unwrap(), Metric::Deaths);
    assert_eq!(Metric::from_str("confirmed").unwrap(), Metric::Confirmed);
    assert!(Metric::from_str("population").is_err());
  }
}
