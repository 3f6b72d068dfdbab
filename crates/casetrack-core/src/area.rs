//! Area identity and aggregate-inclusion flags.
//!
//! Areas are created once, when the registry file is loaded, and never
//! deleted. The synthetic-aggregate rules (which country totals are computed
//! rather than sourced, and which province rows are already counted inside a
//! native country row) are a declarative table here, keyed on country name
//! at registry-load time — after load the flags travel with the series, so
//! merge and aggregate logic never compares country strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::key;

// ─── Aggregate rules ─────────────────────────────────────────────────────────

/// Countries whose feeds report only province-level rows; their country
/// total is a synthetic aggregate, recomputed from provinces on every
/// update cycle.
const SYNTHETIC_TOTAL_COUNTRIES: [&str; 3] = ["China", "Australia", "Canada"];

/// (country, provinces) pairs where the listed province rows duplicate
/// counts already present in that country's own country-level feed row.
/// Such provinces are excluded from the Global aggregate to avoid double
/// counting. An empty province list means every province of that country.
const ROLLED_UP_PROVINCES: [(&str, &[&str]); 2] = [
  ("US", &[]),
  (
    "United Kingdom",
    &["England", "Scotland", "Wales", "Northern Ireland"],
  ),
];

/// Per-area aggregate behaviour, assigned once at registry load.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct AreaFlags {
  /// This country-level series is derived by summing the country's
  /// province rows; it is reset and rebuilt, never incrementally merged.
  pub synthetic_total: bool,

  /// This province's counts are already included in a native country-level
  /// row elsewhere, so it must not contribute to the Global aggregate.
  pub rolled_up: bool,
}

impl AreaFlags {
  /// Derive flags for an area from the rule tables above.
  pub fn for_area(country: &str, province: &str) -> Self {
    let synthetic_total = province.is_empty()
      && SYNTHETIC_TOTAL_COUNTRIES.iter().any(|c| key(c) == key(country));

    let rolled_up = !province.is_empty()
      && ROLLED_UP_PROVINCES.iter().any(|(c, provinces)| {
        key(c) == key(country)
          && (provinces.is_empty()
            || provinces.iter().any(|p| key(p) == key(province)))
      });

    Self {
      synthetic_total,
      rolled_up,
    }
  }
}

// ─── Area ────────────────────────────────────────────────────────────────────

/// Identity and metadata for one geographic area — a country, a province
/// within a country, or the Global pseudo-area (both names empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
  /// Stable id assigned by the registry file; the foreign key used by the
  /// persisted series format.
  pub id: u32,

  /// Country or region name; empty only for the Global area.
  pub country: String,

  /// Province or state name; empty for country-level areas.
  pub province: String,

  pub population: u64,

  pub latitude:  f64,
  pub longitude: f64,

  /// Display colour for charts; opaque to the engine.
  pub color: String,

  /// Date a full-area lockdown started, if one did.
  pub lockdown: Option<NaiveDate>,

  pub flags: AreaFlags,
}

impl Area {
  pub fn is_global(&self) -> bool {
    self.country.is_empty() && self.province.is_empty()
  }

  pub fn is_province(&self) -> bool {
    !self.country.is_empty() && !self.province.is_empty()
  }

  pub fn is_country(&self) -> bool {
    !self.is_global() && !self.is_province()
  }

  /// Case-insensitive, whitespace/hyphen-normalized match on the natural
  /// external key.
  pub fn matches(&self, country: &str, province: &str) -> bool {
    key(&self.country) == key(country) && key(&self.province) == key(province)
  }

  /// Display title: "Global", the country name, or "Province (Country)".
  pub fn title(&self) -> String {
    if self.is_global() {
      "Global".to_string()
    } else if self.is_country() {
      self.country.clone()
    } else {
      format!("{} ({})", self.province, self.country)
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
