//! Declarative name-normalization and row-exclusion tables.
//!
//! Upstream feeds disagree with our area registry about a handful of
//! country and province names, and carry a few rows we deliberately drop
//! (cruise ships and bookkeeping placeholders). Keeping the aliases in one
//! table means a new upstream rename never touches merge logic.

/// Country aliases: feed name → registry name.
const COUNTRY_RENAMES: [(&str, &str); 3] = [
  ("Korea, South", "South Korea"),
  ("Burma", "Myanmar"),
  ("Taiwan*", "Taiwan"),
];

/// Province aliases: feed name → registry name.
const PROVINCE_RENAMES: [(&str, &str); 3] = [
  ("British Virgin Islands", "Virgin Islands"),
  ("Falkland Islands (Malvinas)", "Falkland Islands"),
  ("Falkland Islands (Islas Malvinas)", "Falkland Islands"),
];

/// Known-ignorable rows, dropped entirely — never folded into the
/// catch-all. Cruise ships distort no meaningful area, and `Recovered` is
/// an upstream bookkeeping placeholder, not a place.
const IGNORED_NAMES: [&str; 4] =
  ["Diamond Princess", "Grand Princess", "MS Zaandam", "Recovered"];

/// The registry area that collects rows matching no other area, so global
/// totals are preserved even when upstream invents a new row.
pub const OTHER_COUNTRY: &str = "Other";

/// Apply the country alias table.
pub fn rename_country(country: &str) -> &str {
  COUNTRY_RENAMES
    .iter()
    .find(|(from, _)| *from == country)
    .map(|(_, to)| *to)
    .unwrap_or(country)
}

/// Apply the province alias table.
pub fn rename_province(province: &str) -> &str {
  PROVINCE_RENAMES
    .iter()
    .find(|(from, _)| *from == province)
    .map(|(_, to)| *to)
    .unwrap_or(province)
}

/// True for rows that are dropped outright wherever they appear.
pub fn is_ignored(country: &str, province: &str) -> bool {
  if IGNORED_NAMES.contains(&country) || IGNORED_NAMES.contains(&province) {
    return true;
  }
  // A duplicate of the US Virgin Islands series, variously punctuated.
  if province.starts_with("Virgin Islands, U.S") {
    return true;
  }
  // Zeroed-out legacy US sub-state rows ("Tulare County, CA" style).
  if country == "US" && province.contains(", ") {
    return true;
  }
  false
}
