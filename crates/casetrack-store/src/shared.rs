//! The concurrency discipline around the dataset.
//!
//! One `RwLock` guards the whole dataset: queries take the read half and
//! hand back owned snapshots, updates take the write half. Raw feed text
//! is always parsed before the lock is taken, so a slow or hostile input
//! never stalls readers. Callers therefore never hold the lock across
//! their own work.

use std::{
  path::Path,
  sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use casetrack_core::{AreaSeries, Metric};
use casetrack_feeds::{UkSnapshot, daily, wide};
use chrono::Utc;

use crate::{
  dataset::{Dataset, SelectOption},
  error::{Error, Result},
  storage,
};

pub struct SharedDataset {
  inner: RwLock<Dataset>,
}

impl SharedDataset {
  pub fn new(dataset: Dataset) -> Self {
    Self {
      inner: RwLock::new(dataset),
    }
  }

  /// Load from `data_dir` without holding any lock, then wrap.
  pub fn load(data_dir: &Path) -> Result<Self> {
    Ok(Self::new(storage::load(data_dir)?))
  }

  fn read(&self) -> Result<RwLockReadGuard<'_, Dataset>> {
    self.inner.read().map_err(|_| Error::Lock)
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, Dataset>> {
    self.inner.write().map_err(|_| Error::Lock)
  }

  // ── Queries (read lock, owned results) ─────────────────────────────────

  /// Fetch one series as an owned snapshot.
  pub fn fetch_series(
    &self,
    country: &str,
    province: &str,
  ) -> Result<AreaSeries> {
    Ok(self.read()?.fetch(country, province)?.clone())
  }

  /// Fetch one series windowed to the last `days` days; negative means
  /// the full series.
  pub fn fetch_period(
    &self,
    country: &str,
    province: &str,
    days: i64,
  ) -> Result<AreaSeries> {
    let guard = self.read()?;
    let series = guard.fetch(country, province)?;
    if days < 0 {
      return Ok(series.clone());
    }
    Ok(series.period(days as usize))
  }

  pub fn find_series(&self, id: u32) -> Result<AreaSeries> {
    Ok(self.read()?.find_by_id(id)?.clone())
  }

  /// A datapoint for one date, 0 when the date is not held.
  pub fn value_on(
    &self,
    country: &str,
    province: &str,
    date: chrono::NaiveDate,
    metric: Metric,
  ) -> Result<u64> {
    Ok(self.read()?.fetch(country, province)?.value_on(date, metric))
  }

  pub fn country_options(&self) -> Result<Vec<SelectOption>> {
    Ok(self.read()?.country_options())
  }

  pub fn province_options(&self, country: &str) -> Result<Vec<SelectOption>> {
    Ok(self.read()?.province_options(country))
  }

  // ── Updates (parse first, then write lock) ─────────────────────────────

  /// Replace the dataset wholesale, e.g. after an external reload.
  pub fn replace(&self, dataset: Dataset) -> Result<()> {
    *self.write()? = dataset;
    Ok(())
  }

  /// Extend every series through today (UTC).
  pub fn add_today(&self) -> Result<()> {
    self.write()?.add_today()
  }

  /// Parse and apply one metric's global wide file.
  pub fn apply_wide(&self, metric: Metric, text: &str) -> Result<()> {
    let rows = wide::parse_wide(text)?;
    let mut guard = self.write()?;
    guard.apply_wide(metric, &rows)?;
    guard.recompute_aggregates()?;
    guard.sort();
    Ok(())
  }

  /// Parse and apply one metric's US county wide file.
  pub fn apply_wide_us(&self, metric: Metric, text: &str) -> Result<()> {
    let rows = wide::parse_wide_us(text)?;
    let mut guard = self.write()?;
    guard.apply_wide_us(metric, &rows)?;
    guard.recompute_aggregates()?;
    guard.sort();
    Ok(())
  }

  /// Parse and apply a daily country snapshot.
  pub fn apply_daily_countries(&self, text: &str) -> Result<()> {
    let rows = daily::parse_daily_countries(text)?;
    let now = Utc::now();
    let mut guard = self.write()?;
    guard.apply_daily_countries(&rows, now);
    guard.recompute_aggregates()?;
    guard.sort();
    Ok(())
  }

  /// Parse and apply a daily state snapshot.
  pub fn apply_daily_states(&self, text: &str) -> Result<()> {
    let rows = daily::parse_daily_states(text)?;
    let now = Utc::now();
    let mut guard = self.write()?;
    guard.apply_daily_states(&rows, now);
    guard.recompute_aggregates()?;
    guard.sort();
    Ok(())
  }

  /// Parse and apply the UK government snapshot.
  pub fn apply_uk_snapshot(&self, text: &str) -> Result<()> {
    let snapshot = UkSnapshot::parse(text)?;
    let mut guard = self.write()?;
    guard.apply_uk_snapshot(&snapshot);
    guard.recompute_aggregates()?;
    guard.sort();
    Ok(())
  }

  /// Save the series history. The file text is rendered under the read
  /// lock; the disk write happens after it is released.
  pub fn save(&self, path: &Path) -> Result<()> {
    let text = storage::render(&*self.read()?)?;
    std::fs::write(path, text)?;
    Ok(())
  }
}
