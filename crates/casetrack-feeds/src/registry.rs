//! Area registry parser.
//!
//! The registry CSV is the source of truth for area identity: one row per
//! area, `area_id` unique and stable (it keys the persisted series file).
//! Unlike the case-count feeds, a malformed registry row is fatal —
//! incomplete identity data would poison every later lookup.

use chrono::NaiveDate;

use casetrack_core::{Area, AreaFlags};

use crate::{
  csv,
  error::{Error, Result},
};

const FEED: &str = "area registry";

fn schema(detail: impl Into<String>) -> Error {
  Error::Schema {
    feed:   FEED,
    detail: detail.into(),
  }
}

/// Parse the registry CSV into areas, flags assigned from the aggregate
/// rule tables. Header shape and row completeness are both fatal here.
pub fn parse(input: &str) -> Result<Vec<Area>> {
  let rows = csv::parse(input);
  let Some(header) = rows.first() else {
    return Err(schema("empty file"));
  };

  if header.len() < 8
    || header[0] != "country"
    || header[1] != "province"
    || header[2] != "area_id"
    || header[7] != "colour"
  {
    return Err(schema(format!("unexpected header {header:?}")));
  }

  let mut areas = Vec::with_capacity(rows.len() - 1);
  for (i, row) in rows.iter().enumerate().skip(1) {
    areas.push(parse_row(i + 1, row)?);
  }
  Ok(areas)
}

fn parse_row(line: usize, row: &[String]) -> Result<Area> {
  let bad = |detail: String| Error::Row { line, detail };

  if row.len() < 8 {
    return Err(bad(format!("expected 8 fields, got {}", row.len())));
  }

  let country = row[0].clone();
  let province = row[1].clone();

  let id = row[2]
    .trim()
    .parse::<u32>()
    .map_err(|e| bad(format!("invalid area_id {:?}: {e}", row[2])))?;
  let latitude = row[3]
    .trim()
    .parse::<f64>()
    .map_err(|e| bad(format!("invalid latitude {:?}: {e}", row[3])))?;
  let longitude = row[4]
    .trim()
    .parse::<f64>()
    .map_err(|e| bad(format!("invalid longitude {:?}: {e}", row[4])))?;
  let population = row[5]
    .trim()
    .parse::<u64>()
    .map_err(|e| bad(format!("invalid population {:?}: {e}", row[5])))?;

  let lockdown = if row[6].trim().is_empty() {
    None
  } else {
    Some(
      NaiveDate::parse_from_str(row[6].trim(), "%Y-%m-%d")
        .map_err(|e| bad(format!("invalid lockdown_date {:?}: {e}", row[6])))?,
    )
  };

  let flags = AreaFlags::for_area(&country, &province);

  Ok(Area {
    id,
    country,
    province,
    population,
    latitude,
    longitude,
    color: row[7].clone(),
    lockdown,
    flags,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
