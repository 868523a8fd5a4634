//! Per-country bar chart over the year axis.
//!
//! The X domain always spans the whole dataset's year extent so the axis
//! stays put while the country filter changes; only the Y domain rescales.
//! Highlighting the slider year is a separate pass over an already built
//! scene, so a slider move never rebuilds the bars.

use super::ease::{Easing, Transition};
use super::BarDatum;
use crate::models::{EmissionRecord, Metric};
use crate::scale::{BAR_DEFAULT, BAR_SELECTED};
use plotters::style::RGBColor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const MARGINS: Margins = Margins {
    top: 30.0,
    right: 30.0,
    bottom: 30.0,
    left: 110.0,
};

/// Gap between adjacent bars.
pub const BAR_PADDING: f64 = 1.0;
/// Enter/exit transition for bars.
pub const ENTER_TRANSITION: Transition = Transition::new(2000, Easing::BounceOut);
/// Per-bar stagger, in entry order (reverse order on exit).
pub const STAGGER_MS: u32 = 100;

#[derive(Debug, Clone)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    /// Top of the bar in screen coordinates (baseline is `y + height`).
    pub y: f64,
    pub height: f64,
    pub fill: RGBColor,
    pub delay_ms: u32,
    pub datum: BarDatum,
}

impl Bar {
    pub fn year(&self) -> i32 {
        self.datum.record.year
    }
}

#[derive(Debug, Clone)]
pub struct BarScene {
    pub title: String,
    pub y_label: String,
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    /// Full-dataset year extent backing the X scale.
    pub x_domain: (i32, i32),
    /// Y domain is always [0, y_max].
    pub y_max: f64,
    pub bars: Vec<Bar>,
    pub enter: Transition,
}

/// Build the bar scene for `country` under `metric`.
///
/// `records` is the whole dataset; filtering happens here so the X domain
/// can span every year regardless of the filter.
pub fn update(
    records: &[EmissionRecord],
    metric: Metric,
    country: &str,
    width: f64,
    height: f64,
) -> BarScene {
    let x_domain = year_extent(records);
    let mut filtered: Vec<&EmissionRecord> =
        records.iter().filter(|r| r.country == country).collect();
    filtered.sort_by_key(|r| r.year);

    let y_max = filtered
        .iter()
        .filter_map(|r| metric.value_of(r))
        .fold(0.0_f64, f64::max);

    let step = x_step(x_domain, width);
    let baseline = height - MARGINS.bottom;
    let bars = filtered
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let value = metric.value_of(r).unwrap_or(0.0);
            let top = y_position(value, y_max, height);
            Bar {
                // Centered on the year: midway between x(year - 1) and x(year).
                x: (x_position(r.year, x_domain, width)
                    + x_position(r.year - 1, x_domain, width))
                    / 2.0,
                width: (step - BAR_PADDING).max(0.0),
                y: top,
                height: baseline - top,
                fill: BAR_DEFAULT,
                delay_ms: i as u32 * STAGGER_MS,
                datum: BarDatum {
                    record: (*r).clone(),
                },
            }
        })
        .collect();

    let title = if country.is_empty() {
        "Click on a country".to_string()
    } else {
        format!("Carbon Dioxide {}, {}", metric.label(), country)
    };

    BarScene {
        title,
        y_label: metric.unit().to_string(),
        width,
        height,
        margins: MARGINS,
        x_domain,
        y_max,
        bars,
        enter: ENTER_TRANSITION,
    }
}

/// Recolor bars for the slider year: red for a match, amber otherwise.
/// Runs on every slider move without rebuilding the scene.
pub fn highlight(scene: &mut BarScene, year: i32) {
    for bar in &mut scene.bars {
        bar.fill = if bar.year() == year {
            BAR_SELECTED
        } else {
            BAR_DEFAULT
        };
    }
}

/// Screen X of a year on the stable axis.
pub fn x_position(year: i32, x_domain: (i32, i32), width: f64) -> f64 {
    let (lo, hi) = x_domain;
    let span = (hi - lo).max(1) as f64;
    let t = (year - lo) as f64 / span;
    MARGINS.left + t * (width - MARGINS.right - MARGINS.left)
}

/// One year's worth of X spacing.
pub fn x_step(x_domain: (i32, i32), width: f64) -> f64 {
    x_position(x_domain.0 + 1, x_domain, width) - MARGINS.left
}

/// Screen Y of a value against the [0, y_max] domain.
pub fn y_position(value: f64, y_max: f64, height: f64) -> f64 {
    let baseline = height - MARGINS.bottom;
    if y_max <= 0.0 {
        return baseline;
    }
    let t = (value / y_max).clamp(0.0, 1.0);
    baseline - t * (baseline - MARGINS.top)
}

/// Whole-year tick positions for the X axis.
pub fn x_ticks(scene: &BarScene) -> Vec<(f64, String)> {
    let (lo, hi) = scene.x_domain;
    let count = (hi - lo).max(1) as usize;
    let step = (count as f64 / 10.0).ceil().max(1.0) as i32;
    (lo..=hi)
        .step_by(step as usize)
        .map(|y| {
            (
                x_position(y, scene.x_domain, scene.width),
                y.to_string(),
            )
        })
        .collect()
}

/// Round-stepped tick values for the Y axis.
pub fn y_ticks(scene: &BarScene) -> Vec<(f64, String)> {
    nice_ticks(scene.y_max, 10)
        .into_iter()
        .map(|v| {
            (
                y_position(v, scene.y_max, scene.height),
                format_tick(v),
            )
        })
        .collect()
}

/// Tick values for [0, max] at a 1/2/5 step, at most `count` + 1 of them.
pub fn nice_ticks(max: f64, count: usize) -> Vec<f64> {
    if max <= 0.0 || count == 0 {
        return vec![0.0];
    }
    let raw = max / count as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let mut out = Vec::new();
    let mut v = 0.0;
    while v <= max + step * 1e-9 {
        out.push(v);
        v += step;
    }
    out
}

fn format_tick(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// The bar under the point, if any.
pub fn hit(scene: &BarScene, x: f64, y: f64) -> Option<&Bar> {
    scene.bars.iter().find(|b| {
        x >= b.x && x <= b.x + b.width && y >= b.y && y <= b.y + b.height
    })
}

fn year_extent(records: &[EmissionRecord]) -> (i32, i32) {
    let lo = records.iter().map(|r| r.year).min().unwrap_or(0);
    let hi = records.iter().map(|r| r.year).max().unwrap_or(0);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, year: i32, emissions: f64) -> EmissionRecord {
        EmissionRecord {
            continent: "Europe".into(),
            country: country.into(),
            country_code: "250".into(),
            emissions: Some(emissions),
            per_capita: Some(emissions / 10.0),
            per_gdp: None,
            region: String::new(),
            year,
        }
    }

    fn sample() -> Vec<EmissionRecord> {
        vec![
            rec("France", 2000, 100.0),
            rec("France", 2002, 300.0),
            rec("France", 2001, 200.0),
            rec("Germany", 2000, 800.0),
            rec("Germany", 2003, 400.0),
        ]
    }

    #[test]
    fn filters_to_the_country_and_sorts_by_year() {
        let scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        let years: Vec<i32> = scene.bars.iter().map(|b| b.year()).collect();
        assert_eq!(years, [2000, 2001, 2002]);
    }

    #[test]
    fn x_domain_spans_the_whole_dataset_regardless_of_filter() {
        let scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        // Germany's 2003 widens the axis even though France stops at 2002.
        assert_eq!(scene.x_domain, (2000, 2003));
    }

    #[test]
    fn y_max_tracks_the_filtered_country_and_the_metric() {
        let records = sample();
        let france = update(&records, Metric::Emissions, "France", 900.0, 430.0);
        assert_eq!(france.y_max, 300.0);
        let germany = update(&records, Metric::Emissions, "Germany", 900.0, 430.0);
        assert_eq!(germany.y_max, 800.0);
        let capita = update(&records, Metric::PerCapita, "France", 900.0, 430.0);
        assert_eq!(capita.y_max, 30.0);
    }

    #[test]
    fn bar_heights_are_proportional_to_values() {
        let records = vec![rec("Testland", 2000, 100.0), rec("Testland", 2001, 200.0)];
        let scene = update(&records, Metric::Emissions, "Testland", 900.0, 430.0);
        assert_eq!(scene.y_max, 200.0);
        assert_eq!(scene.bars.len(), 2);
        let h100 = scene.bars[0].height;
        let h200 = scene.bars[1].height;
        assert!((h200 / h100 - 2.0).abs() < 1e-9);
        let plot_height = 430.0 - MARGINS.bottom - MARGINS.top;
        assert!((h200 - plot_height).abs() < 1e-9);
    }

    #[test]
    fn bars_are_a_step_wide_minus_padding_and_centered_on_their_year() {
        let scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        let step = x_step(scene.x_domain, 900.0);
        let bar = &scene.bars[1];
        assert!((bar.width - (step - BAR_PADDING)).abs() < 1e-9);
        let center_2001 = x_position(2001, scene.x_domain, 900.0);
        assert!((bar.x + step / 2.0 - center_2001).abs() < 1e-9);
    }

    #[test]
    fn stagger_grows_with_index() {
        let scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        let delays: Vec<u32> = scene.bars.iter().map(|b| b.delay_ms).collect();
        assert_eq!(delays, [0, 100, 200]);
    }

    #[test]
    fn empty_selection_titles_the_prompt() {
        let scene = update(&sample(), Metric::Emissions, "", 900.0, 430.0);
        assert_eq!(scene.title, "Click on a country");
        assert!(scene.bars.is_empty());
    }

    #[test]
    fn selected_title_names_metric_and_country() {
        let scene = update(&sample(), Metric::PerCapita, "France", 900.0, 430.0);
        assert_eq!(scene.title, "Carbon Dioxide Emissions Per Capita, France");
        assert_eq!(scene.y_label, "metric tonnes per capita");
    }

    #[test]
    fn highlight_marks_only_the_matching_year() {
        let mut scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        highlight(&mut scene, 2001);
        let fills: Vec<RGBColor> = scene.bars.iter().map(|b| b.fill).collect();
        assert_eq!(fills, [BAR_DEFAULT, BAR_SELECTED, BAR_DEFAULT]);
        highlight(&mut scene, 1990);
        assert!(scene.bars.iter().all(|b| b.fill == BAR_DEFAULT));
    }

    #[test]
    fn hit_finds_a_bar_by_point() {
        let scene = update(&sample(), Metric::Emissions, "France", 900.0, 430.0);
        let b = &scene.bars[2];
        let found = hit(&scene, b.x + b.width / 2.0, b.y + b.height / 2.0).unwrap();
        assert_eq!(found.year(), 2002);
        assert!(hit(&scene, 0.0, 0.0).is_none());
    }

    #[test]
    fn nice_ticks_use_round_steps() {
        assert_eq!(nice_ticks(800.0, 10), vec![
            0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0
        ]);
        assert_eq!(nice_ticks(0.0, 10), vec![0.0]);
        let t = nice_ticks(7.3, 10);
        assert_eq!(t.first(), Some(&0.0));
        assert!(*t.last().unwrap() <= 7.3 + 1e-9);
    }
}
