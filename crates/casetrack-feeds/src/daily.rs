//! Daily snapshot parsers.
//!
//! Narrow files with one row per area carrying the latest cumulative
//! counts, in two shapes: the per-country file and the per-state file.
//! Column order differs from our canonical order and, unhelpfully, the
//! counts arrive as floats. We have no tested figures from these feeds,
//! so `tested` is never set here.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::{
  csv,
  error::{Error, Result},
  policy,
};

/// One snapshot row ready to apply as a ratchet update. `updated` is
/// `None` when the feed left the timestamp blank; the store substitutes
/// the time of import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayRow {
  pub country:   String,
  pub province:  String,
  pub updated:   Option<DateTime<Utc>>,
  pub deaths:    u64,
  pub confirmed: u64,
  pub recovered: u64,
}

/// Parse the per-country snapshot.
/// Cols: Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active
pub fn parse_daily_countries(input: &str) -> Result<Vec<TodayRow>> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("daily country snapshot", "empty file"));
  };
  if header.len() < 8
    || header[0] != "Country_Region"
    || header[1] != "Last_Update"
    || header[7] != "Active"
  {
    return Err(schema(
      "daily country snapshot",
      format!("unexpected header {header:?}"),
    ));
  }

  let mut out = Vec::new();
  for (i, row) in rows.iter().enumerate().skip(1) {
    if row.len() < 8 {
      warn!(line = i + 1, "short daily country row, skipping");
      continue;
    }
    let country = policy::rename_country(&row[0]).to_string();
    // The UK feed is authoritative for the United Kingdom.
    if country == "United Kingdom" || policy::is_ignored(&country, "") {
      continue;
    }
    match snapshot_counts(&row[1], &row[5], &row[4], &row[6]) {
      Ok((updated, deaths, confirmed, recovered)) => out.push(TodayRow {
        country,
        province: String::new(),
        updated,
        deaths,
        confirmed,
        recovered,
      }),
      Err(e) => warn!(line = i + 1, %country, error = %e,
        "bad daily country row, skipping"),
    }
  }
  Ok(out)
}

/// Parse the per-state snapshot.
/// Cols: Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active
pub fn parse_daily_states(input: &str) -> Result<Vec<TodayRow>> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("daily state snapshot", "empty file"));
  };
  if header.len() < 9
    || header[0] != "Province_State"
    || header[1] != "Country_Region"
    || header[2] != "Last_Update"
    || header[8] != "Active"
  {
    return Err(schema(
      "daily state snapshot",
      format!("unexpected header {header:?}"),
    ));
  }

  let mut out = Vec::new();
  for (i, row) in rows.iter().enumerate().skip(1) {
    if row.len() < 9 {
      warn!(line = i + 1, "short daily state row, skipping");
      continue;
    }
    let country = policy::rename_country(&row[1]).to_string();
    let province = policy::rename_province(&row[0]).to_string();
    if policy::is_ignored(&country, &province) {
      continue;
    }
    match snapshot_counts(&row[2], &row[6], &row[5], &row[7]) {
      Ok((updated, deaths, confirmed, recovered)) => out.push(TodayRow {
        country,
        province,
        updated,
        deaths,
        confirmed,
        recovered,
      }),
      Err(e) => warn!(line = i + 1, %country, %province, error = %e,
        "bad daily state row, skipping"),
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

/// Two timestamp layouts are seen in the wild; blank means unknown.
fn parse_updated(s: &str) -> Result<Option<DateTime<Utc>>> {
  if s.is_empty() {
    return Ok(None);
  }
  for format in ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
      return Ok(Some(naive.and_utc()));
    }
  }
  Err(Error::Row {
    line:   0,
    detail: format!("unreadable timestamp {s:?}"),
  })
}

/// Counts come as floats ("half a death, presumably"); truncate. Blank
/// cells read as zero and rely on the ratchet to preserve prior values.
fn snapshot_count(s: &str) -> Result<u64> {
  if s.is_empty() {
    return Ok(0);
  }
  let value: f64 = s.parse().map_err(|e| Error::Row {
    line:   0,
    detail: format!("unreadable count {s:?}: {e}"),
  })?;
  Ok(value.max(0.0) as u64)
}

fn snapshot_counts(
  updated: &str,
  deaths: &str,
  confirmed: &str,
  recovered: &str,
) -> Result<(Option<DateTime<Utc>>, u64, u64, u64)> {
  Ok((
    parse_updated(updated)?,
    snapshot_count(deaths)?,
    snapshot_count(confirmed)?,
    snapshot_count(recovered)?,
  ))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  const COUNTRY_HEADER: &str =
    "Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active";
  const STATE_HEADER: &str = "Province_State,Country_Region,Last_Update,Lat,\
                              Long_,Confirmed,Deaths,Recovered,Active";

  #[test]
  fn parses_country_rows_and_skips_the_uk() {
    let input = format!(
      "{COUNTRY_HEADER}\n\
       France,2020-04-01 04:10:12,46.2,2.2,52827.0,3532.0,9513.0,39782.0\n\
       United Kingdom,2020-04-01 04:10:12,55.3,-3.4,25481.0,1793.0,135.0,0\n\
       \"Korea, South\",2020-04-01 04:10:12,36.0,128.0,9887.0,165.0,5567.0,0\n"
    );
    let rows = parse_daily_countries(&input).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].country, "France");
    assert_eq!(rows[0].deaths, 3532);
    assert_eq!(rows[0].confirmed, 52827);
    assert_eq!(rows[0].recovered, 9513);
    assert_eq!(
      rows[0].updated,
      Some(Utc.with_ymd_and_hms(2020, 4, 1, 4, 10, 12).unwrap())
    );
    assert_eq!(rows[1].country, "South Korea");
  }

  #[test]
  fn accepts_the_alternate_timestamp_format() {
    let input = format!(
      "{COUNTRY_HEADER}\n\
       France,4/1/2020 04:10,46.2,2.2,52827,3532,9513,39782\n"
    );
    let rows = parse_daily_countries(&input).unwrap();
    assert_eq!(
      rows[0].updated,
      Some(Utc.with_ymd_and_hms(2020, 4, 1, 4, 10, 0).unwrap())
    );
  }

  #[test]
  fn blank_timestamp_and_counts_are_tolerated() {
    let input = format!(
      "{COUNTRY_HEADER}\n\
       France,,46.2,2.2,,3532,,0\n"
    );
    let rows = parse_daily_countries(&input).unwrap();
    assert_eq!(rows[0].updated, None);
    assert_eq!(rows[0].confirmed, 0);
    assert_eq!(rows[0].deaths, 3532);
  }

  #[test]
  fn bad_count_skips_the_row_only() {
    let input = format!(
      "{COUNTRY_HEADER}\n\
       France,2020-04-01 04:10:12,46.2,2.2,oops,3532,9513,0\n\
       Spain,2020-04-01 04:10:12,40.4,-3.7,104118,9387,22647,0\n"
    );
    let rows = parse_daily_countries(&input).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].country, "Spain");
  }

  #[test]
  fn rejects_wrong_country_header() {
    let input = "Country,Updated,Lat,Long_,Confirmed,Deaths,Recovered,Active\n";
    assert!(matches!(
      parse_daily_countries(input),
      Err(Error::Schema { .. })
    ));
  }

  #[test]
  fn parses_state_rows_with_renames_and_ignores() {
    let input = format!(
      "{STATE_HEADER}\n\
       Falkland Islands (Malvinas),United Kingdom,2020-04-01 04:10:12,\
       -51.8,-59.5,2,0,0,2\n\
       Diamond Princess,US,2020-04-01 04:10:12,0,0,49,0,0,49\n\
       New York,US,2020-04-01 04:10:12,42.2,-74.9,83712.0,1941.0,0.0,81771.0\n"
    );
    let rows = parse_daily_states(&input).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].province, "Falkland Islands");
    assert_eq!(rows[1].province, "New York");
    assert_eq!(rows[1].deaths, 1941);
    assert_eq!(rows[1].confirmed, 83712);
  }
}
