//! Wide-format historical time-series parsers.
//!
//! One row per area, one column per date from 1/22/20 onwards; a separate
//! file per metric (the file name says which). Two shapes exist: the global
//! file (province, country, lat, long, then dates) and the US county file
//! (eleven leading identity columns — twelve in the deaths variant, which
//! inexplicably gains a Population column — then dates).

use tracing::warn;

use crate::{
  csv,
  error::{Error, Result},
  policy,
};

/// One parsed wide row: a full run of cumulative values for one area,
/// aligned to the epoch date. Renames are already applied and ignorable
/// rows already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow {
  pub country:  String,
  pub province: String,
  pub values:   Vec<u64>,
}

/// Parse the global wide file. A malformed header is fatal; malformed data
/// rows are skipped and logged.
pub fn parse_wide(input: &str) -> Result<Vec<WideRow>> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("wide series", "empty file"));
  };
  if header.len() < 5
    || header[0] != "Province/State"
    || header[1] != "Country/Region"
    || header[2] != "Lat"
    || header[4] != "1/22/20"
  {
    return Err(schema("wide series", format!("unexpected header {header:?}")));
  }

  let mut out = Vec::new();
  for (i, row) in rows.iter().enumerate().skip(1) {
    if let Some(parsed) = parse_area_row(i + 1, row, 1, 0, 4) {
      out.push(parsed);
    }
  }
  Ok(out)
}

/// Parse the US county wide file. Counties arrive one row each with no
/// state-level rollup; the caller sums them into state series. The date
/// columns start after the identity block, whose width depends on whether
/// a `Population` column is present.
pub fn parse_wide_us(input: &str) -> Result<Vec<WideRow>> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("US wide series", "empty file"));
  };
  if header.len() < 12
    || header[6] != "Province_State"
    || header[7] != "Country_Region"
  {
    return Err(schema(
      "US wide series",
      format!("unexpected header {header:?}"),
    ));
  }
  let date_index = if header[11] == "Population" { 12 } else { 11 };
  if header.get(date_index).map(String::as_str) != Some("1/22/20") {
    return Err(schema(
      "US wide series",
      format!("first date column not 1/22/20 at index {date_index}"),
    ));
  }

  let mut out = Vec::new();
  for (i, row) in rows.iter().enumerate().skip(1) {
    if let Some(parsed) = parse_area_row(i + 1, row, 7, 6, date_index) {
      out.push(parsed);
    }
  }
  Ok(out)
}

fn schema(feed: &'static str, detail: impl Into<String>) -> Error {
  Error::Schema {
    feed,
    detail: detail.into(),
  }
}

/// Parse one data row: apply renames, drop ignorables, read the date run.
/// Returns `None` for dropped or skipped rows.
fn parse_area_row(
  line: usize,
  row: &[String],
  country_col: usize,
  province_col: usize,
  date_index: usize,
) -> Option<WideRow> {
  if row.len() <= date_index {
    warn!(line, "wide row too short, skipping");
    return None;
  }

  let country = policy::rename_country(&row[country_col]).to_string();
  let province = policy::rename_province(&row[province_col]).to_string();
  if policy::is_ignored(&country, &province) {
    return None;
  }

  let mut values = Vec::with_capacity(row.len() - date_index);
  for cell in &row[date_index..] {
    let cell = cell.trim();
    if cell.is_empty() {
      // Typically a clerical error — a row ending in a stray comma.
      values.push(0);
      continue;
    }
    match cell.parse::<u64>() {
      Ok(v) => values.push(v),
      Err(e) => {
        warn!(line, %country, %province, cell, error = %e,
          "bad day value in wide row, skipping row");
        return None;
      }
    }
  }

  Some(WideRow {
    country,
    province,
    values,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
