//! Continent pie chart for the selected year.
//!
//! Slice values are deliberately bound to the absolute Emissions field no
//! matter which metric the dashboard has selected: the pie is always the
//! year's absolute emissions mix. Do not "fix" this by wiring the metric
//! through.

use super::ease::{Easing, Transition};
use super::PieDatum;
use crate::models::EmissionRecord;
use crate::scale;
use plotters::style::RGBColor;
use std::f64::consts::TAU;

/// Hover transition growing a slice to the full radius.
pub const HOVER_TRANSITION: Transition = Transition::new(1000, Easing::CubicInOut);
/// Default slice stroke.
pub const STROKE: RGBColor = RGBColor(223, 241, 255);
pub const STROKE_WIDTH: f64 = 0.2;
/// Hovered slice stroke.
pub const HOVER_STROKE: RGBColor = RGBColor(255, 255, 255);
pub const HOVER_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct Slice {
    /// Radians clockwise from 12 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub fill: RGBColor,
    pub datum: PieDatum,
}

impl Slice {
    pub fn angle(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Share of the full circle, in percent.
    pub fn percentage(&self) -> f64 {
        100.0 * self.angle() / TAU
    }
}

#[derive(Debug, Clone)]
pub struct PieScene {
    pub title: String,
    pub cx: f64,
    pub cy: f64,
    /// Resting outer radius.
    pub radius: f64,
    /// Outer radius while hovered.
    pub hover_radius: f64,
    pub slices: Vec<Slice>,
    pub hover: Transition,
}

/// Build the pie scene for `year`. Slices are sorted by continent, then by
/// emissions ascending within a continent; angles accumulate clockwise from
/// 12 o'clock and are proportional to each record's emissions.
pub fn update(records: &[EmissionRecord], year: i32, width: f64, height: f64) -> PieScene {
    let filtered: Vec<&EmissionRecord> = records.iter().filter(|r| r.year == year).collect();

    // Palette keys on first-seen order in dataset order, before the sort.
    let palette = scale::continent_color(filtered.iter().copied());
    let fill_of = |continent: &str| -> RGBColor {
        palette
            .iter()
            .find(|(c, _)| c == continent)
            .map(|&(_, color)| color)
            .unwrap_or(scale::NO_DATA)
    };

    let mut sorted = filtered;
    sorted.sort_by(|a, b| {
        a.continent.cmp(&b.continent).then(
            a.emissions
                .unwrap_or(0.0)
                .total_cmp(&b.emissions.unwrap_or(0.0)),
        )
    });

    let total: f64 = sorted
        .iter()
        .map(|r| r.emissions.unwrap_or(0.0).max(0.0))
        .sum();

    let mut slices = Vec::with_capacity(sorted.len());
    let mut angle = 0.0;
    for r in &sorted {
        let value = r.emissions.unwrap_or(0.0).max(0.0);
        let sweep = if total > 0.0 { TAU * value / total } else { 0.0 };
        slices.push(Slice {
            start_angle: angle,
            end_angle: angle + sweep,
            fill: fill_of(&r.continent),
            datum: PieDatum {
                record: (*r).clone(),
                start_angle: angle,
                end_angle: angle + sweep,
            },
        });
        angle += sweep;
    }

    PieScene {
        title: format!("Total Emissions by continent and region, {year}"),
        cx: width / 2.0,
        cy: height / 2.0 + 10.0,
        radius: height / 2.0 - 50.0,
        hover_radius: height / 2.0,
        slices,
        hover: HOVER_TRANSITION,
    }
}

/// Point on the arc at `angle` (clockwise from 12 o'clock) and `radius`.
pub fn arc_point(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Tessellate a slice's outline at `radius` for filled rendering: center,
/// then points along the arc.
pub fn slice_outline(scene: &PieScene, slice: &Slice, radius: f64) -> Vec<(f64, f64)> {
    let steps = ((slice.angle() / TAU * 96.0).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((scene.cx, scene.cy));
    for i in 0..=steps {
        let a = slice.start_angle + slice.angle() * i as f64 / steps as f64;
        points.push(arc_point(scene.cx, scene.cy, radius, a));
    }
    points
}

/// The slice under the point, testing against `radius` (pass the hover
/// radius while a slice is grown).
pub fn hit(scene: &PieScene, x: f64, y: f64, radius: f64) -> Option<&Slice> {
    hit_index(scene, x, y, radius).map(|i| &scene.slices[i])
}

/// Index of the slice under the point.
pub fn hit_index(scene: &PieScene, x: f64, y: f64, radius: f64) -> Option<usize> {
    let dx = x - scene.cx;
    let dy = y - scene.cy;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > radius || dist == 0.0 {
        return None;
    }
    // atan2 with 0 at 12 o'clock, growing clockwise.
    let mut angle = dx.atan2(-dy);
    if angle < 0.0 {
        angle += TAU;
    }
    scene
        .slices
        .iter()
        .position(|s| angle >= s.start_angle && angle < s.end_angle)
}
