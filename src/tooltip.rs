//! Floating annotation for the mark under the pointer.
//!
//! Content is computed from the hovered mark's typed datum alone: the
//! [`HoverTarget`] discriminant says which chart owns the mark, so nothing
//! here inspects rendered output. Every mark gets the same country /
//! metric value / year block; pie slices add their share of the circle.

use crate::charts::HoverTarget;
use crate::models::Metric;
use num_format::{Locale, ToFormattedString};
use std::f64::consts::TAU;

/// Vertical gap between the pointer and the tooltip's bottom edge.
pub const POINTER_GAP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub lines: Vec<String>,
}

/// Build the tooltip for a hovered mark. `slider_year` fills in when the
/// datum itself carries no year (a map stub).
pub fn content(target: &HoverTarget, metric: Metric, slider_year: i32) -> TooltipContent {
    let (country, record, percentage) = match target {
        HoverTarget::Map(d) => (d.country.clone(), d.record.as_ref(), None),
        HoverTarget::Bar(d) => (d.record.country.clone(), Some(&d.record), None),
        HoverTarget::Pie(d) => (
            d.record.country.clone(),
            Some(&d.record),
            Some(100.0 * (d.end_angle - d.start_angle) / TAU),
        ),
    };

    let value_line = match record.and_then(|r| metric.value_of(r)) {
        Some(v) if v.is_finite() && v != 0.0 => {
            format!("{}: {} {}", metric.label(), format_value(v), metric.unit())
        }
        _ => format!("{}: Data Unavailable", metric.label()),
    };
    let year = record.map(|r| r.year).unwrap_or(slider_year);

    let mut lines = vec![
        format!("Country: {country}"),
        value_line,
        format!("Year: {year}"),
    ];
    if let Some(p) = percentage {
        lines.push(format!("Percentage of total: {p:.2}%"));
    }
    TooltipContent { lines }
}

/// Anchor the tooltip horizontally centered on the pointer, just above it.
pub fn position(pointer: (f64, f64), size: (f64, f64)) -> (f64, f64) {
    (
        pointer.0 - size.0 / 2.0,
        pointer.1 - size.1 - POINTER_GAP,
    )
}

/// Locale-style value formatting: grouped integer part, up to three decimal
/// places with trailing zeros trimmed.
pub fn format_value(v: f64) -> String {
    let negative = v < 0.0;
    // Round to the displayed precision first so the carry propagates into
    // the integer part instead of printing "x.1." style artifacts.
    let abs = (v.abs() * 1000.0).round() / 1000.0;
    let int = abs.trunc() as i64;
    let grouped = int.to_formatted_string(&Locale::en);
    let frac = format!("{:.3}", abs.fract());
    let frac = frac[2..].trim_end_matches('0');
    let mut out = String::new();
    if negative && (int != 0 || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}
