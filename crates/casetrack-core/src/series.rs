//! AreaSeries — one area's dense, epoch-anchored day sequence.
//!
//! The sequence has no gaps: `days[i].date == days[0].date + i` always, and
//! for a freshly built series `days[0].date` is the dataset [`epoch`]. Feeds
//! routinely arrive with more or fewer days than we hold, so range writes
//! grow the sequence lazily and merges silently ignore overflow rather than
//! failing; the only hard error is a date misalignment, which means the
//! caller (or the upstream feed) is broken.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Area, Day, Error, Metric, Result, epoch};

/// One area's cumulative time series plus area metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaSeries {
  pub area: Area,

  /// Latest feed timestamp observed for this area.
  pub updated_at: Option<DateTime<Utc>>,

  days: Vec<Day>,

  /// The day immediately before a truncation window, kept by [`period`]
  /// so per-day deltas at the window boundary stay computable.
  ///
  /// [`period`]: AreaSeries::period
  previous_day: Option<Day>,
}

impl AreaSeries {
  pub fn new(area: Area) -> Self {
    Self {
      area,
      updated_at: None,
      days: Vec::new(),
      previous_day: None,
    }
  }

  // ── Accessors ──────────────────────────────────────────────────────────

  pub fn days(&self) -> &[Day] {
    &self.days
  }

  pub fn len(&self) -> usize {
    self.days.len()
  }

  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }

  pub fn previous_day(&self) -> Option<&Day> {
    self.previous_day.as_ref()
  }

  /// First day of the current view; an empty default when there are none.
  pub fn first_day(&self) -> Day {
    self.days.first().cloned().unwrap_or_default()
  }

  /// Last day of the current view; an empty default when there are none.
  pub fn last_day(&self) -> Day {
    self.days.last().cloned().unwrap_or_default()
  }

  /// Second-to-last day; an empty default when fewer than two days.
  pub fn penultimate_day(&self) -> Day {
    if self.days.len() < 2 {
      return Day::default();
    }
    self.days[self.days.len() - 2].clone()
  }

  pub fn matches(&self, country: &str, province: &str) -> bool {
    self.area.matches(country, province)
  }

  /// The cumulative value for `metric` on `date`, or 0 when the date is
  /// not in this view.
  pub fn value_on(&self, date: NaiveDate, metric: Metric) -> u64 {
    self
      .days
      .iter()
      .find(|d| d.date == date)
      .map(|d| d.get(metric))
      .unwrap_or(0)
  }

  // ── Growth ─────────────────────────────────────────────────────────────

  /// Extend the sequence by `count` empty days, dated consecutively from
  /// the day after the current last day (or from the epoch if empty).
  pub fn append_days(&mut self, count: usize) {
    let mut date = match self.days.last() {
      Some(last) => last.date + Days::new(1),
      None => epoch(),
    };
    self.days.reserve(count);
    for _ in 0..count {
      self.days.push(Day::new(date));
      date = date + Days::new(1);
    }
  }

  /// Append one day for "today" carrying forward the last day's cumulative
  /// values — a placeholder that later ratchet updates will raise. No-op on
  /// an empty series.
  pub fn add_today(&mut self) {
    let Some(last) = self.days.last() else {
      return;
    };
    let mut day = last.clone();
    day.date = last.date + Days::new(1);
    self.days.push(day);
  }

  // ── Range writes ───────────────────────────────────────────────────────

  /// Replace one metric's values across the aligned range starting at
  /// `start`. Grows the sequence when `values` is longer than it; extra
  /// stored days beyond `values` are left untouched.
  pub fn set_range(
    &mut self,
    start: NaiveDate,
    metric: Metric,
    values: &[u64],
  ) -> Result<()> {
    self.align_range(start, values.len())?;
    for (day, value) in self.days.iter_mut().zip(values) {
      day.set(metric, *value);
    }
    Ok(())
  }

  /// Like [`set_range`](AreaSeries::set_range) but adds to existing values
  /// — used when one metric arrives split across feeds that must be summed.
  pub fn merge_range(
    &mut self,
    start: NaiveDate,
    metric: Metric,
    values: &[u64],
  ) -> Result<()> {
    self.align_range(start, values.len())?;
    for (day, value) in self.days.iter_mut().zip(values) {
      day.merge(metric, *value);
    }
    Ok(())
  }

  /// Grow to cover `len` days and verify the first stored day sits on
  /// `start`.
  fn align_range(&mut self, start: NaiveDate, len: usize) -> Result<()> {
    if self.days.len() < len {
      let missing = len - self.days.len();
      self.append_days(missing);
    }
    if let Some(first) = self.days.first()
      && first.date != start
    {
      return Err(Error::DateMismatch {
        expected: first.date,
        found:    start,
      });
    }
    Ok(())
  }

  /// Day-by-day merge of `other` into this series at matching offsets.
  /// Extends this series when `other` is longer; silently ignores the tail
  /// when `other` is shorter (partial-coverage feeds are routine). Advances
  /// `updated_at` to the later of the two.
  pub fn merge_series(&mut self, other: &AreaSeries) -> Result<()> {
    if let Some(at) = other.updated_at {
      self.touch_updated(at);
    }
    if self.days.len() < other.days.len() {
      let missing = other.days.len() - self.days.len();
      self.append_days(missing);
    }
    for (day, other_day) in self.days.iter_mut().zip(&other.days) {
      day.merge_day(other_day)?;
    }
    Ok(())
  }

  // ── Today ratchet ──────────────────────────────────────────────────────

  /// Raise today's counts to the observed values, per field, never
  /// lowering them. Live snapshot feeds are occasionally stale or
  /// partially populated — a field reported as 0 must not erase a
  /// previously observed higher value — and several independent feeds
  /// update the same "today" entry over the course of a day.
  pub fn update_today(
    &mut self,
    observed_at: DateTime<Utc>,
    deaths: u64,
    confirmed: u64,
    recovered: u64,
    tested: u64,
  ) {
    self.touch_updated(observed_at);
    let Some(today) = self.days.last_mut() else {
      return;
    };
    today.deaths = today.deaths.max(deaths);
    today.confirmed = today.confirmed.max(confirmed);
    today.recovered = today.recovered.max(recovered);
    today.tested = today.tested.max(tested);
  }

  /// Advance `updated_at` if `at` is later than the current value.
  pub fn touch_updated(&mut self, at: DateTime<Utc>) {
    if self.updated_at.is_none_or(|current| current < at) {
      self.updated_at = Some(at);
    }
  }

  // ── Historical point writes ────────────────────────────────────────────

  /// Set all counts for the 1-based day offset `day_number`, lazily
  /// extending the sequence to cover it. Used when loading the persisted
  /// sparse format.
  pub fn set_day(
    &mut self,
    day_number: usize,
    deaths: u64,
    confirmed: u64,
    recovered: u64,
    tested: u64,
  ) {
    if day_number == 0 {
      return;
    }
    let index = day_number - 1;
    if index >= self.days.len() {
      let missing = index + 1 - self.days.len();
      self.append_days(missing);
    }
    self.days[index].set_all(deaths, confirmed, recovered, tested);
  }

  /// Overwrite one metric on the day with exactly `date`, if this view
  /// holds it. Returns whether a day matched.
  pub fn set_value_on(
    &mut self,
    date: NaiveDate,
    metric: Metric,
    value: u64,
  ) -> bool {
    match self.days.iter_mut().find(|d| d.date == date) {
      Some(day) => {
        day.set(metric, value);
        true
      }
      None => false,
    }
  }

  /// Raise the last day's value for `metric` to at least the penultimate
  /// day's — used after historical rewrites that may leave a stale,
  /// lower "today".
  pub fn carry_forward_last(&mut self, metric: Metric) {
    if self.days.len() < 2 {
      return;
    }
    let last = self.days.len() - 1;
    let prev = self.days[last - 1].get(metric);
    if self.days[last].get(metric) < prev {
      self.days[last].set(metric, prev);
    }
  }

  /// Clear every day's counts to zero, preserving length and dates.
  /// Used before recomputing a synthetic aggregate from scratch.
  pub fn reset_days(&mut self) {
    for day in &mut self.days {
      day.set_all(0, 0, 0, 0);
    }
  }

  // ── Windowing ──────────────────────────────────────────────────────────

  /// A read-only view over the last `n` days, carrying the day before the
  /// window as `previous_day`. Returns the full series unchanged when `n`
  /// covers it.
  pub fn period(&self, n: usize) -> AreaSeries {
    if n >= self.days.len() {
      return self.clone();
    }
    let start = self.days.len() - n;
    AreaSeries {
      area: self.area.clone(),
      updated_at: self.updated_at,
      days: self.days[start..].to_vec(),
      previous_day: Some(self.days[start - 1].clone()),
    }
  }

  // ── Derived values ─────────────────────────────────────────────────────

  /// Cumulative values for `metric`, one per day of the current view.
  pub fn values(&self, metric: Metric) -> Vec<u64> {
    self.days.iter().map(|d| d.get(metric)).collect()
  }

  /// Per-day changes for `metric`, one per day of the current view. The
  /// first element is measured against `previous_day` when the view is a
  /// window, else 0. Negative deltas are possible when upstream data is
  /// corrected downwards.
  pub fn daily_deltas(&self, metric: Metric) -> Vec<i64> {
    let mut previous = self
      .previous_day
      .as_ref()
      .map(|d| d.get(metric))
      .unwrap_or(0) as i64;
    self
      .days
      .iter()
      .map(|d| {
        let value = d.get(metric) as i64;
        let delta = value - previous;
        previous = value;
        delta
      })
      .collect()
  }

  /// Cumulative change over the current view: last-day value minus the
  /// value at the view's entry baseline. For a windowed view the baseline
  /// is `previous_day` (the count held when the window began), so an
  /// N-day window covers N days of change; for the full series it is the
  /// first day.
  pub fn total(&self, metric: Metric) -> i64 {
    let baseline = match &self.previous_day {
      Some(day) => day.get(metric),
      None => self.first_day().get(metric),
    };
    self.last_day().get(metric) as i64 - baseline as i64
  }

  pub fn total_deaths(&self) -> i64 {
    self.total(Metric::Deaths)
  }

  pub fn total_confirmed(&self) -> i64 {
    self.total(Metric::Confirmed)
  }

  pub fn total_recovered(&self) -> i64 {
    self.total(Metric::Recovered)
  }

  pub fn total_tested(&self) -> i64 {
    self.total(Metric::Tested)
  }
}

impl fmt::Display for AreaSeries {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({} days)", self.area.title(), self.days.len())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
