//! Integration-level dataset tests: persistence round-trips, aggregate
//! rebuilds, and the locked update surface.

use casetrack_core::{Area, AreaFlags, Metric, epoch};
use chrono::Utc;

use crate::{Dataset, Error, SharedDataset, load_series, render};

fn area(id: u32, country: &str, province: &str) -> Area {
  Area {
    id,
    country: country.to_string(),
    province: province.to_string(),
    population: 0,
    latitude: 0.0,
    longitude: 0.0,
    color: "#cccccc".to_string(),
    lockdown: None,
    flags: AreaFlags::for_area(country, province),
  }
}

/// Global, a plain country, a rolled-up-country pair, and a synthetic
/// total country with two provinces.
fn sample_dataset() -> Dataset {
  let mut dataset = Dataset::from_areas(vec![
    area(1, "", ""),
    area(2, "France", ""),
    area(3, "US", ""),
    area(4, "US", "New York"),
    area(5, "China", ""),
    area(6, "China", "Hubei"),
    area(7, "China", "Beijing"),
    area(8, "Other", ""),
  ]);
  for series in dataset.iter_mut() {
    series.append_days(3);
  }

  let start = epoch();
  let set = |d: &mut Dataset, country: &str, province: &str, deaths: &[u64]| {
    d.fetch_mut(country, province)
      .unwrap()
      .set_range(start, Metric::Deaths, deaths)
      .unwrap();
  };
  set(&mut dataset, "France", "", &[0, 2, 5]);
  set(&mut dataset, "US", "", &[1, 3, 7]);
  set(&mut dataset, "US", "New York", &[1, 2, 4]);
  set(&mut dataset, "China", "Hubei", &[10, 20, 30]);
  set(&mut dataset, "China", "Beijing", &[1, 1, 2]);
  dataset
}

#[test]
fn synthetic_country_total_is_the_sum_of_its_provinces() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();

  let china = dataset.fetch("China", "").unwrap();
  assert_eq!(china.values(Metric::Deaths), vec![11, 21, 32]);
  assert_eq!(china.total_deaths(), 32 - 11);
}

#[test]
fn global_never_double_counts_rolled_up_rows() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();

  // France + US + China provinces. New York is inside the US row and the
  // synthetic China total is itself derived, so neither contributes.
  let global = dataset.fetch("", "").unwrap();
  assert_eq!(
    global.values(Metric::Deaths),
    vec![0 + 1 + 10 + 1, 2 + 3 + 20 + 1, 5 + 7 + 30 + 2]
  );
}

#[test]
fn recompute_is_idempotent() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();
  let first = dataset.fetch("", "").unwrap().values(Metric::Deaths);
  dataset.recompute_aggregates().unwrap();
  assert_eq!(dataset.fetch("", "").unwrap().values(Metric::Deaths), first);
}

#[test]
fn sort_puts_deaths_first_then_alphabetical() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();
  dataset.sort();

  let order: Vec<String> =
    dataset.iter().map(|s| s.area.title()).collect();
  // Global leads with the largest total; Other has no deaths and sorts
  // into the alphabetical tail.
  assert_eq!(order[0], "Global");
  let other_pos = order.iter().position(|t| t == "Other").unwrap();
  assert!(other_pos > order.len() - 2);
}

#[test]
fn save_load_round_trip_preserves_values() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();

  let text = render(&dataset).unwrap();

  let mut reloaded = Dataset::from_areas(vec![
    area(1, "", ""),
    area(2, "France", ""),
    area(3, "US", ""),
    area(4, "US", "New York"),
    area(5, "China", ""),
    area(6, "China", "Hubei"),
    area(7, "China", "Beijing"),
    area(8, "Other", ""),
  ]);
  load_series(&mut reloaded, &text).unwrap();

  for (before, after) in dataset.iter().zip(reloaded.iter()) {
    assert_eq!(before.area.id, after.area.id);
    assert_eq!(
      before.values(Metric::Deaths),
      after.values(Metric::Deaths),
      "deaths differ for {}",
      before.area.title()
    );
  }
}

#[test]
fn render_omits_all_zero_rows() {
  let dataset = sample_dataset();
  let text = render(&dataset).unwrap();
  // France's day 1 is all zero and must not appear; its day 2 must.
  assert!(!text.contains("1,2,0,0,0,0"));
  assert!(text.contains("2,2,2,0,0,0"));
}

#[test]
fn render_on_empty_dataset_fails() {
  let dataset = Dataset::default();
  assert!(matches!(render(&dataset), Err(Error::EmptyDataset)));
}

#[test]
fn load_series_falls_back_when_last_day_number_is_unreadable() {
  let mut dataset = Dataset::from_areas(vec![area(1, "", "")]);
  let text = "day,area_id,deaths,confirmed,recovered,tested\n\
              1,1,1,0,0,0\n\
              garbled,1,2,0,0,0\n";
  load_series(&mut dataset, text).unwrap();

  let expected = (Utc::now().date_naive() - epoch()).num_days().max(0) as usize;
  assert_eq!(dataset.day_count(), expected);
}

#[test]
fn load_series_rejects_unknown_header() {
  let mut dataset = Dataset::from_areas(vec![area(1, "", "")]);
  let text = "day,series,deaths,confirmed,recovered,checked\n1,1,1,0,0,0\n";
  assert!(matches!(
    load_series(&mut dataset, text),
    Err(Error::Feed(casetrack_feeds::Error::Schema { .. }))
  ));
}

#[test]
fn add_today_is_idempotent_within_a_day() {
  let mut dataset = sample_dataset();
  dataset.add_today().unwrap();
  let first = dataset.day_count();
  dataset.add_today().unwrap();
  assert_eq!(dataset.day_count(), first);

  // The appended tail carries the last cumulative values forward.
  let france = dataset.fetch("France", "").unwrap();
  assert_eq!(france.last_day().deaths, 5);
}

#[test]
fn add_today_on_empty_dataset_fails() {
  let mut dataset = Dataset::default();
  assert!(matches!(dataset.add_today(), Err(Error::EmptyDataset)));
}

#[test]
fn wide_rows_for_unknown_areas_fold_into_the_catch_all() {
  let mut dataset = sample_dataset();
  let rows = vec![
    casetrack_feeds::WideRow {
      country:  "Atlantis".to_string(),
      province: String::new(),
      values:   vec![0, 1, 2],
    },
    casetrack_feeds::WideRow {
      country:  "Lemuria".to_string(),
      province: String::new(),
      values:   vec![1, 1, 1],
    },
  ];
  dataset.apply_wide(Metric::Deaths, &rows).unwrap();

  let other = dataset.fetch("Other", "").unwrap();
  assert_eq!(other.values(Metric::Deaths), vec![1, 2, 3]);
}

#[test]
fn schema_error_leaves_the_dataset_unchanged() {
  let shared = SharedDataset::new(sample_dataset());
  let before = render(&shared_snapshot(&shared)).unwrap();

  let bad = "Province,Country,Updated,Lat,Long_,Confirmed,Deaths,\
             Recovered,Active\nNew York,US,2020-04-01 04:10:12,0,0,9,9,9,9\n";
  assert!(matches!(
    shared.apply_daily_states(bad),
    Err(Error::Feed(casetrack_feeds::Error::Schema { .. }))
  ));

  let after = render(&shared_snapshot(&shared)).unwrap();
  assert_eq!(before, after);
}

#[test]
fn daily_snapshot_ratchets_todays_counts() {
  let shared = SharedDataset::new(sample_dataset());
  let header = "Province_State,Country_Region,Last_Update,Lat,Long_,\
                Confirmed,Deaths,Recovered,Active";

  let text = format!(
    "{header}\nNew York,US,2020-01-24 04:10:12,42.2,-74.9,50,55,0,0\n"
  );
  shared.apply_daily_states(&text).unwrap();
  let ny = shared.fetch_series("US", "New York").unwrap();
  assert_eq!(ny.last_day().deaths, 55);

  // A later snapshot reporting zero must not erase the 55.
  let outage = format!(
    "{header}\nNew York,US,2020-01-24 05:00:00,42.2,-74.9,0,0,0,0\n"
  );
  shared.apply_daily_states(&outage).unwrap();
  let ny = shared.fetch_series("US", "New York").unwrap();
  assert_eq!(ny.last_day().deaths, 55);
  assert_eq!(ny.last_day().confirmed, 50);
}

#[test]
fn uk_snapshot_sets_historical_deaths_by_date() {
  let shared = SharedDataset::new(uk_dataset());
  let doc = r#"{
    "overview": [
      {"areaName": "United Kingdom", "reportingDate": "2020-01-23",
       "cumulativeDeaths": 3}
    ],
    "countries": [
      {"areaName": "Wales", "reportingDate": "2020-01-23",
       "cumulativeDeaths": 1}
    ]
  }"#;
  shared.apply_uk_snapshot(doc).unwrap();

  let wales = shared.fetch_series("United Kingdom", "Wales").unwrap();
  assert_eq!(wales.value_on(epoch() + chrono::Days::new(1), Metric::Deaths), 1);
  // Last day had no reported figure; the fixup carries the 1 forward, so
  // the windowed and full-series totals agree.
  assert_eq!(wales.last_day().deaths, 1);
  assert_eq!(wales.total_deaths(), 1);

  let uk = shared.fetch_series("United Kingdom", "").unwrap();
  assert_eq!(uk.total_deaths(), 3);
}

#[test]
fn fetch_period_returns_a_window_with_context() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();
  let shared = SharedDataset::new(dataset);

  let window = shared.fetch_period("France", "", 2).unwrap();
  assert_eq!(window.values(Metric::Deaths), vec![2, 5]);
  // previous_day gives the first in-window delta its true baseline.
  assert_eq!(window.daily_deltas(Metric::Deaths), vec![2, 3]);

  let full = shared.fetch_period("France", "", -1).unwrap();
  assert_eq!(full.len(), 3);
}

#[test]
fn options_reflect_display_order_and_death_tolls() {
  let mut dataset = sample_dataset();
  dataset.recompute_aggregates().unwrap();
  dataset.sort();

  let countries = dataset.country_options();
  assert_eq!(countries[0].name, "Global");
  assert!(countries.iter().any(|o| o.name == "China (21 Deaths)"));
  assert!(countries.iter().any(|o| o.name == "Other"));

  let provinces = dataset.province_options("China");
  assert_eq!(provinces[0].name, "All Areas");
  assert!(provinces.iter().any(|o| o.name == "Hubei (20 Deaths)"));

  let periods = crate::period_options();
  assert_eq!(periods[0].value, "-1");
  assert_eq!(periods.last().unwrap().name, "3 Days");
}

/// Three days of zeroed UK data so snapshot dates can land on real days.
fn uk_dataset() -> Dataset {
  let mut dataset = Dataset::from_areas(vec![
    area(1, "", ""),
    area(2, "United Kingdom", ""),
    area(3, "United Kingdom", "Wales"),
    area(4, "United Kingdom", "England"),
  ]);
  for series in dataset.iter_mut() {
    series.append_days(3);
  }
  dataset
}

fn shared_snapshot(shared: &SharedDataset) -> Dataset {
  let mut dataset = sample_dataset();
  // Rehydrate a plain dataset from the shared one for comparison.
  for series in dataset.iter_mut() {
    let current = shared
      .fetch_series(&series.area.country, &series.area.province)
      .unwrap();
    *series = current;
  }
  dataset
}
