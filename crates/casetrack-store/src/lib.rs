//! Storage and query engine for the Casetrack dataset.
//!
//! Holds every area's cumulative series in memory behind one
//! reader/writer lock, persists it as a sparse CSV, and merges updates
//! parsed by [`casetrack_feeds`]. [`SharedDataset`] is the surface most
//! callers want; [`Dataset`] is the unlocked engine underneath.

mod apply;
mod dataset;
mod storage;

pub mod error;
pub mod shared;

pub use dataset::{Dataset, SelectOption, period_options};
pub use error::{Error, Result};
pub use shared::SharedDataset;
pub use storage::{load, load_series, render, save};

#[cfg(test)]
mod tests;
