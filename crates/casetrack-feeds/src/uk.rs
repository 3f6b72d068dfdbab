//! UK government nested JSON snapshot.
//!
//! One document with two lists: `overview` (whole-UK figures) and
//! `countries` (the four home nations). Both hold the same entry shape.
//! Entries are recovered by scanning on `areaName`, never by position,
//! since the lists interleave nations and dates freely. Only cumulative
//! deaths are carried by this feed.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;

/// The home-nation provinces this feed covers, as named in the registry.
pub const UK_NATIONS: [&str; 4] =
  ["England", "Scotland", "Wales", "Northern Ireland"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UkEntry {
  pub area_name:      String,
  pub reporting_date: NaiveDate,
  #[serde(default)]
  pub cumulative_deaths: Option<f64>,
}

/// The full UK snapshot document.
#[derive(Debug, Clone, Deserialize)]
pub struct UkSnapshot {
  pub overview:  Vec<UkEntry>,
  pub countries: Vec<UkEntry>,
}

impl UkSnapshot {
  pub fn parse(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }

  /// Cumulative deaths per reporting date for one area. `"United
  /// Kingdom"` reads the overview list; the home nations read the
  /// countries list.
  pub fn deaths_by_date(&self, area_name: &str) -> HashMap<NaiveDate, u64> {
    let list = if area_name == "United Kingdom" {
      &self.overview
    } else {
      &self.countries
    };
    list
      .iter()
      .filter(|entry| entry.area_name == area_name)
      .map(|entry| {
        let deaths = entry.cumulative_deaths.unwrap_or(0.0).max(0.0) as u64;
        (entry.reporting_date, deaths)
      })
      .collect()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
