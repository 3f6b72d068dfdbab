//! Merging parsed feed rows into the dataset.
//!
//! Each upstream format has its own merge discipline: historical wide
//! files replace a whole metric run, the US county file sums county rows
//! into state series, daily snapshots ratchet today's entry upward, and
//! the UK snapshot rewrites historical deaths by date. Rows naming an
//! unknown area are logged and either folded into the catch-all or
//! dropped, never fatal.

use casetrack_core::{Metric, epoch};
use casetrack_feeds::{TodayRow, UkSnapshot, WideRow, policy, uk::UK_NATIONS};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{dataset::Dataset, error::Result};

impl Dataset {
  /// Apply one metric's global wide file. Known areas get their run
  /// replaced wholesale; unknown rows are summed into the catch-all
  /// series so the Global total still sees them.
  pub fn apply_wide(
    &mut self,
    metric: Metric,
    rows: &[WideRow],
  ) -> Result<()> {
    info!(%metric, rows = rows.len(), "applying wide series");
    for row in rows {
      if self.fetch(&row.country, &row.province).is_ok() {
        let series = self.fetch_mut(&row.country, &row.province)?;
        series.set_range(epoch(), metric, &row.values)?;
      } else {
        warn!(country = %row.country, province = %row.province,
          "no series for wide row, folding into catch-all");
        let other = self.fetch_mut(policy::OTHER_COUNTRY, "")?;
        other.merge_range(epoch(), metric, &row.values)?;
      }
    }
    Ok(())
  }

  /// Apply one metric's US county wide file. Counties carry no state
  /// rollup, so every county row is summed into its state series.
  pub fn apply_wide_us(
    &mut self,
    metric: Metric,
    rows: &[WideRow],
  ) -> Result<()> {
    info!(%metric, rows = rows.len(), "applying US wide series");
    for row in rows {
      match self.fetch_mut(&row.country, &row.province) {
        Ok(series) => series.merge_range(epoch(), metric, &row.values)?,
        Err(_) => {
          warn!(country = %row.country, province = %row.province,
            "no state series for US wide row, dropping");
        }
      }
    }
    Ok(())
  }

  /// Apply a daily country snapshot: ratchet each country's today entry.
  /// `now` stands in when a row carries no timestamp.
  pub fn apply_daily_countries(
    &mut self,
    rows: &[TodayRow],
    now: DateTime<Utc>,
  ) {
    info!(rows = rows.len(), "applying daily country snapshot");
    self.apply_today_rows(rows, now);
  }

  /// Apply a daily state snapshot, same ratchet discipline per state.
  pub fn apply_daily_states(&mut self, rows: &[TodayRow], now: DateTime<Utc>) {
    info!(rows = rows.len(), "applying daily state snapshot");
    self.apply_today_rows(rows, now);
  }

  fn apply_today_rows(&mut self, rows: &[TodayRow], now: DateTime<Utc>) {
    for row in rows {
      match self.fetch_mut(&row.country, &row.province) {
        Ok(series) => {
          // These feeds carry no tested figures; 0 leaves them unchanged.
          series.update_today(
            row.updated.unwrap_or(now),
            row.deaths,
            row.confirmed,
            row.recovered,
            0,
          );
        }
        Err(_) => warn!(country = %row.country, province = %row.province,
          "no series for snapshot row, dropping"),
      }
    }
  }

  /// Apply the UK government snapshot: overwrite historical deaths by
  /// exact reporting date for the United Kingdom and the four home
  /// nations, then make sure the in-progress last day never dips below
  /// the day before it.
  pub fn apply_uk_snapshot(&mut self, snapshot: &UkSnapshot) {
    for name in
      ["United Kingdom"].into_iter().chain(UK_NATIONS)
    {
      let (country, province) = if name == "United Kingdom" {
        ("United Kingdom", "")
      } else {
        ("United Kingdom", name)
      };
      let deaths = snapshot.deaths_by_date(name);
      let Ok(series) = self.fetch_mut(country, province) else {
        warn!(%name, "no series for UK snapshot area");
        continue;
      };
      info!(%name, dates = deaths.len(), "applying UK deaths");
      for (date, value) in &deaths {
        series.set_value_on(*date, Metric::Deaths, *value);
      }
      series.carry_forward_last(Metric::Deaths);
    }
  }
}
