//! Progress reporting for scrape runs.
//!
//! A [`ProgressHub`] holds the latest [`ScrapeProgress`] snapshot and fans
//! every published snapshot out to subscribers in publication order. The
//! [`renderer`] turns snapshots into terminal lines.

pub mod errors;
pub mod hub;
pub mod renderer;

pub use errors::ProgressError;
pub use hub::{ProgressHub, ProgressStream};
pub use pn_core::{ScrapeProgress, ScrapeStatus};
pub use renderer::{follow, render_line};
