//! The in-memory dataset: every area's series, in display order.

use casetrack_core::{Area, AreaSeries, Error as CoreError, epoch, key};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// One entry for a selection list (country, province or period pickers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
  pub name:  String,
  pub value: String,
}

/// Periods offered by the period picker; `-1` means the full series.
pub fn period_options() -> Vec<SelectOption> {
  let mut options = vec![SelectOption {
    name:  "All Time".to_string(),
    value: "-1".to_string(),
  }];
  for days in [112, 56, 28, 14, 7, 3] {
    options.push(SelectOption {
      name:  format!("{days} Days"),
      value: days.to_string(),
    });
  }
  options
}

/// All series, one per registry area, held in the order queries see them:
/// deaths descending, then country name for the all-zero tail.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  series: Vec<AreaSeries>,
}

impl Dataset {
  /// Build an empty dataset with one zero-day series per registry area.
  pub fn from_areas(areas: Vec<Area>) -> Self {
    Self {
      series: areas.into_iter().map(AreaSeries::new).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.series.len()
  }

  pub fn is_empty(&self) -> bool {
    self.series.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &AreaSeries> {
    self.series.iter()
  }

  pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AreaSeries> {
    self.series.iter_mut()
  }

  /// Days held by the series (all series share one length after load).
  pub fn day_count(&self) -> usize {
    self.series.first().map_or(0, AreaSeries::len)
  }

  // ── Lookup ─────────────────────────────────────────────────────────────

  /// Find the series for a country/province pair (case-insensitive,
  /// whitespace/hyphen-normalized). The Global series is `("", "")`.
  pub fn fetch(&self, country: &str, province: &str) -> Result<&AreaSeries> {
    self
      .series
      .iter()
      .find(|s| s.matches(country, province))
      .ok_or_else(|| not_found(country, province))
  }

  pub fn fetch_mut(
    &mut self,
    country: &str,
    province: &str,
  ) -> Result<&mut AreaSeries> {
    self
      .series
      .iter_mut()
      .find(|s| s.matches(country, province))
      .ok_or_else(|| not_found(country, province))
  }

  /// Find the series for a registry area id.
  pub fn find_by_id(&self, id: u32) -> Result<&AreaSeries> {
    self
      .series
      .iter()
      .find(|s| s.area.id == id)
      .ok_or(CoreError::NotFoundId(id).into())
  }

  pub fn find_by_id_mut(&mut self, id: u32) -> Result<&mut AreaSeries> {
    self
      .series
      .iter_mut()
      .find(|s| s.area.id == id)
      .ok_or(CoreError::NotFoundId(id).into())
  }

  // ── Day bookkeeping ────────────────────────────────────────────────────

  /// Ensure every series runs up to and including today (UTC), carrying
  /// the last known cumulative values forward. Idempotent within a day.
  pub fn add_today(&mut self) -> Result<()> {
    if self.series.is_empty() {
      return Err(crate::error::Error::EmptyDataset);
    }
    let wanted = (Utc::now().date_naive() - epoch()).num_days() + 1;
    let have = self.day_count() as i64;
    if wanted <= have {
      debug!(have, wanted, "dataset already covers today");
      return Ok(());
    }
    for _ in have..wanted {
      for series in &mut self.series {
        series.add_today();
      }
    }
    Ok(())
  }

  // ── Aggregates ─────────────────────────────────────────────────────────

  /// Rebuild every derived series from scratch: the per-country synthetic
  /// totals (countries the feeds only report at province level), then the
  /// Global series from everything that is not already counted elsewhere.
  pub fn recompute_aggregates(&mut self) -> Result<()> {
    let targets: Vec<usize> = self
      .series
      .iter()
      .enumerate()
      .filter(|(_, s)| s.area.is_global() || s.area.flags.synthetic_total)
      .map(|(i, _)| i)
      .collect();

    for &i in &targets {
      let mut rebuilt = self.series[i].clone();
      rebuilt.reset_days();
      let global = rebuilt.area.is_global();
      let country = rebuilt.area.country.clone();

      for (j, source) in self.series.iter().enumerate() {
        if j == i {
          continue;
        }
        let include = if global {
          counts_toward_global(source)
        } else {
          source.area.is_province() && key(&source.area.country) == key(&country)
        };
        if include {
          rebuilt.merge_series(source)?;
        }
      }

      debug!(series = %rebuilt, deaths = rebuilt.total_deaths(),
        "rebuilt aggregate");
      self.series[i] = rebuilt;
    }
    Ok(())
  }

  // ── Ordering ───────────────────────────────────────────────────────────

  /// Display order: deaths descending while anyone has deaths, then
  /// alphabetical by country for the zero tail.
  pub fn sort(&mut self) {
    self.series.sort_by(|a, b| {
      let (da, db) = (a.total_deaths(), b.total_deaths());
      if da > 0 || db > 0 {
        db.cmp(&da)
          .then_with(|| a.area.country.cmp(&b.area.country))
      } else {
        a.area.country.cmp(&b.area.country)
      }
    });
  }

  // ── Projections ────────────────────────────────────────────────────────

  /// Country picker entries: Global first, then every country-level series
  /// in display order, annotated with its death toll when non-zero.
  pub fn country_options(&self) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
      name:  "Global".to_string(),
      value: String::new(),
    }];
    for s in &self.series {
      if s.area.is_country() {
        options.push(SelectOption {
          name:  annotate(&s.area.country, s.total_deaths()),
          value: key(&s.area.country),
        });
      }
    }
    options
  }

  /// Province picker entries for one country.
  pub fn province_options(&self, country: &str) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
      name:  "All Areas".to_string(),
      value: String::new(),
    }];
    for s in &self.series {
      if s.area.is_province() && key(&s.area.country) == key(country) {
        options.push(SelectOption {
          name:  annotate(&s.area.province, s.total_deaths()),
          value: key(&s.area.province),
        });
      }
    }
    options
  }
}

fn not_found(country: &str, province: &str) -> crate::error::Error {
  CoreError::NotFound {
    country:  country.to_string(),
    province: province.to_string(),
  }
  .into()
}

fn annotate(name: &str, deaths: i64) -> String {
  if deaths > 0 {
    format!("{name} ({deaths} Deaths)")
  } else {
    name.to_string()
  }
}

/// Whether a series contributes to the Global aggregate. Synthetic country
/// totals and rolled-up provinces are already counted once elsewhere.
fn counts_toward_global(s: &AreaSeries) -> bool {
  !s.area.is_global()
    && !s.area.flags.synthetic_total
    && !s.area.flags.rolled_up
}
