//! Persistence: the area registry plus the sparse series history.
//!
//! The history file has one row per area per day with any non-zero count
//! (`day,area_id,deaths,confirmed,recovered,tested`, day numbers 1-based
//! from the epoch date). All-zero rows are omitted on save and implied as
//! zero on load, so the on-disk file stays a fraction of the dense size.

use std::{fmt::Write as _, fs, path::Path, time::Instant};

use casetrack_core::epoch;
use casetrack_feeds::{csv, registry};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
  dataset::Dataset,
  error::{Error, Result},
};

const SERIES_HEADER: &str = "day,area_id,deaths,confirmed,recovered,tested";

/// Load a full dataset from `data_dir` (`areas.csv` + `series.csv`),
/// extend it to cover today, rebuild aggregates and sort for display.
pub fn load(data_dir: &Path) -> Result<Dataset> {
  let start = Instant::now();

  let areas_text = fs::read_to_string(data_dir.join("areas.csv"))?;
  let areas = registry::parse(&areas_text)?;
  let mut dataset = Dataset::from_areas(areas);

  let series_text = fs::read_to_string(data_dir.join("series.csv"))?;
  load_series(&mut dataset, &series_text)?;

  dataset.add_today()?;
  dataset.recompute_aggregates()?;
  dataset.sort();

  info!(
    areas = dataset.len(),
    days = dataset.day_count(),
    elapsed = ?start.elapsed(),
    "loaded dataset"
  );
  Ok(dataset)
}

/// Load the sparse series history into a dataset that already holds its
/// areas. Series are first zero-filled out to the file's day count, taken
/// from the last row's day number; when that is unreadable we fall back
/// to the number of whole days since the epoch, i.e. through yesterday.
pub fn load_series(dataset: &mut Dataset, input: &str) -> Result<()> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("empty file"));
  };
  if header.len() < 6
    || header[0] != "day"
    || header[1] != "area_id"
    || header[5] != "tested"
  {
    return Err(schema(format!("unexpected header {header:?}")));
  }

  let days = rows
    .last()
    .and_then(|row| row[0].parse::<usize>().ok())
    .unwrap_or_else(|| {
      let fallback = (Utc::now().date_naive() - epoch()).num_days().max(0);
      warn!(fallback, "unreadable day number on last row, assuming yesterday");
      fallback as usize
    });
  info!(days, "loading series history");

  for series in dataset.iter_mut() {
    series.append_days(days);
  }

  for (i, row) in rows.iter().enumerate().skip(1) {
    if row.len() != 6 {
      return Err(
        casetrack_feeds::Error::Row {
          line:   i + 1,
          detail: format!("expected 6 columns, got {}", row.len()),
        }
        .into(),
      );
    }
    let v: Vec<u64> =
      row.iter().map(|s| s.parse().unwrap_or_default()).collect();
    let Ok(series) = dataset.find_by_id_mut(v[1] as u32) else {
      warn!(line = i + 1, area_id = v[1], "series row for unknown area");
      continue;
    };
    series.set_day(v[0] as usize, v[2], v[3], v[4], v[5]);
  }
  Ok(())
}

/// Render the sparse series file. Rows are day-major and ordered by area
/// id within a day, so appending a day appends to the file.
pub fn render(dataset: &Dataset) -> Result<String> {
  if dataset.is_empty() || dataset.day_count() == 0 {
    return Err(Error::EmptyDataset);
  }

  let mut by_id: Vec<_> = dataset.iter().collect();
  by_id.sort_by_key(|s| s.area.id);

  let mut out = String::with_capacity(64 * 1024);
  out.push_str(SERIES_HEADER);
  out.push('\n');
  for i in 0..dataset.day_count() {
    for series in &by_id {
      let Some(day) = series.days().get(i) else {
        continue;
      };
      if day.is_empty() {
        continue;
      }
      // Writing into a String is infallible.
      let _ = writeln!(
        out,
        "{},{},{},{},{},{}",
        i + 1,
        series.area.id,
        day.deaths,
        day.confirmed,
        day.recovered,
        day.tested
      );
    }
  }
  Ok(out)
}

/// Save the series history to `path`, replacing any existing file.
pub fn save(dataset: &Dataset, path: &Path) -> Result<()> {
  let text = render(dataset)?;
  fs::write(path, &text)?;
  info!(path = %path.display(), bytes = text.len(), "saved series history");
  Ok(())
}

fn schema(detail: impl Into<String>) -> Error {
  casetrack_feeds::Error::Schema {
    feed:   "series history",
    detail: detail.into(),
  }
  .into()
}
