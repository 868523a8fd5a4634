//! co2view-rs
//!
//! A lightweight Rust library for exploring a CO2-emissions country/year
//! dataset. Pairs with the `co2view` CLI and the `co2view-gui` dashboard.
//!
//! ### Features
//! - Load the emissions CSV and a GeoJSON world-geometry document
//! - Build choropleth map, per-country bar, and per-year pie scenes as pure
//!   functions of (data, state)
//! - Hit-test scenes and compute the hover tooltip from typed mark data
//! - Export any scene as SVG/PNG
//! - Quick summary statistics (min, max, mean, median) per continent
//!
//! ### Example
//! ```no_run
//! use co2view_rs::{charts, Dataset, SelectionState};
//!
//! let mut data = Dataset::load("world.geojson", "emissions.csv")?;
//! let state = SelectionState::new(data.year_extent().0);
//! data.attach_year(state.selected_year);
//! let map = charts::map::update(&data.features, &state, 900.0, 600.0);
//! co2view_rs::render::export_map(&map, "map.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod charts;
pub mod dataset;
pub mod interact;
pub mod models;
pub mod render;
pub mod scale;
pub mod stats;
pub mod storage;
pub mod tooltip;

pub use dataset::{Dataset, LoadError};
pub use interact::{Dispatcher, Event, Refresh};
pub use models::{EmissionRecord, GeometryFeature, Metric, SelectionState};
