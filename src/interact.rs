//! Input-event dispatch.
//!
//! One explicit table from input events to state updates plus the set of
//! chart refreshes each event requires. Re-rendering is idempotent given
//! (data, state), so over-refreshing is harmless, but the table stays
//! minimal: a slider move recolors the bars without rebuilding them.

use crate::models::{Metric, SelectionState};

/// An input-control event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The year slider moved.
    YearChanged(i32),
    /// The metric radio group changed.
    MetricChanged(Metric),
    /// A country mark on the map was clicked.
    CountryClicked(String),
}

/// Which views the event invalidated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refresh {
    pub map: bool,
    pub pie: bool,
    /// Rebuild the bar scene.
    pub bar: bool,
    /// Recolor existing bars for the slider year.
    pub bar_highlight: bool,
}

/// Applies events to the selection state.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    /// Dataset year extent; incoming years clamp to it.
    pub year_extent: (i32, i32),
}

impl Dispatcher {
    pub fn new(year_extent: (i32, i32)) -> Self {
        Self { year_extent }
    }

    pub fn apply(&self, state: &mut SelectionState, event: Event) -> Refresh {
        match event {
            Event::YearChanged(year) => {
                state.selected_year = year.clamp(self.year_extent.0, self.year_extent.1);
                Refresh {
                    map: true,
                    pie: true,
                    bar_highlight: true,
                    ..Refresh::default()
                }
            }
            Event::MetricChanged(metric) => {
                state.selected_metric = metric;
                Refresh {
                    map: true,
                    bar: true,
                    ..Refresh::default()
                }
            }
            Event::CountryClicked(country) => {
                // Clicking the active country toggles the selection off, as
                // does clicking a shape the dataset has no name for.
                if country.is_empty()
                    || state.selected_country.as_deref() == Some(country.as_str())
                {
                    state.selected_country = None;
                } else {
                    state.selected_country = Some(country);
                }
                Refresh {
                    bar: true,
                    bar_highlight: true,
                    ..Refresh::default()
                }
            }
        }
    }
}
