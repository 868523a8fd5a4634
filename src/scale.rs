//! Color scales for the three charts: the map's threshold ramp, the pie's
//! continent palette, and the bar highlight pair.
//!
//! The map thresholds are fixed per metric and are never recomputed from
//! the loaded data's range: the ramp must stay comparable across years and
//! metrics, so a min/max-derived domain would be wrong here.

use crate::models::{EmissionRecord, Metric};
use plotters::style::RGBColor;

/// Four-stop blue ramp, light to dark.
pub const RAMP: [RGBColor; 4] = [
    RGBColor(90, 174, 214),
    RGBColor(6, 146, 198),
    RGBColor(8, 48, 107),
    RGBColor(8, 45, 80),
];

/// Fill for countries with no usable value for the selected metric/year.
pub const NO_DATA: RGBColor = RGBColor(204, 204, 204);

/// Bar fill for the year currently selected on the slider.
pub const BAR_SELECTED: RGBColor = RGBColor(255, 0, 0);
/// Bar fill for every other year.
pub const BAR_DEFAULT: RGBColor = RGBColor(241, 196, 15);

/// Continent palette for the pie chart, assigned in first-seen order.
pub const CONTINENT_PALETTE: [RGBColor; 5] = [
    RGBColor(255, 112, 67),
    RGBColor(100, 221, 23),
    RGBColor(3, 155, 229),
    RGBColor(224, 64, 251),
    RGBColor(255, 23, 68),
];

/// Fixed breakpoint table for a metric, matching `RAMP` stop for stop.
pub fn thresholds(metric: Metric) -> [f64; 4] {
    match metric {
        Metric::Emissions => [0.0, 250_000.0, 1_000_000.0, 5_000_000.0],
        Metric::PerCapita => [0.0, 0.5, 2.0, 10.0],
        Metric::PerGdp => [0.0, 0.5, 1.0, 2.5],
    }
}

/// Map a metric value to its ramp color.
///
/// Missing, non-finite, and at-or-below-zero values all land on `NO_DATA`.
/// In-range values interpolate linearly within their threshold segment;
/// values past the last threshold extrapolate along the final segment with
/// channels saturating at 0/255.
pub fn color_for(metric: Metric, value: Option<f64>) -> RGBColor {
    let domain = thresholds(metric);
    match value {
        Some(v) if v.is_finite() && v > domain[0] => interpolate(&domain, &RAMP, v),
        _ => NO_DATA,
    }
}

/// Piecewise-linear interpolation over parallel domain/range stop arrays.
fn interpolate(domain: &[f64; 4], range: &[RGBColor; 4], v: f64) -> RGBColor {
    // Find the segment; past the end, extrapolate on the last one.
    let mut i = domain.len() - 2;
    for seg in 0..domain.len() - 1 {
        if v <= domain[seg + 1] {
            i = seg;
            break;
        }
    }
    let span = domain[i + 1] - domain[i];
    let t = if span > 0.0 { (v - domain[i]) / span } else { 0.0 };
    lerp_rgb(range[i], range[i + 1], t)
}

fn lerp_rgb(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let ch = |x: u8, y: u8| -> u8 {
        let v = x as f64 + (y as f64 - x as f64) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    RGBColor(ch(a.0, b.0), ch(a.1, b.1), ch(a.2, b.2))
}

/// Assign each continent present in `records` a palette color, keyed by the
/// order continents first appear (dataset order, not slice order).
pub fn continent_color<'a, I>(records: I) -> Vec<(String, RGBColor)>
where
    I: IntoIterator<Item = &'a EmissionRecord>,
{
    let mut out: Vec<(String, RGBColor)> = Vec::new();
    for r in records {
        if !out.iter().any(|(c, _)| c == &r.continent) {
            let color = CONTINENT_PALETTE[out.len() % CONTINENT_PALETTE.len()];
            out.push((r.continent.clone(), color));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intensity(c: RGBColor) -> f64 {
        // Perceived darkness; the ramp runs light blue to near-black blue.
        255.0 - (0.299 * c.0 as f64 + 0.587 * c.1 as f64 + 0.114 * c.2 as f64)
    }

    #[test]
    fn ramp_hits_its_stops() {
        let d = thresholds(Metric::PerCapita);
        // Stops 2..4 reproduce exactly; stop 1 is the zero threshold, which
        // deliberately falls on the no-data side.
        assert_eq!(color_for(Metric::PerCapita, Some(d[1])), RAMP[1]);
        assert_eq!(color_for(Metric::PerCapita, Some(d[2])), RAMP[2]);
        assert_eq!(color_for(Metric::PerCapita, Some(d[3])), RAMP[3]);
    }

    #[test]
    fn ramp_is_monotonic_in_intensity() {
        let d = thresholds(Metric::Emissions);
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = d[0] + (d[3] - d[0]) * (i as f64 / 100.0);
            let cur = intensity(color_for(Metric::Emissions, Some(v)));
            assert!(
                cur >= prev - 1e-9,
                "intensity dipped at v={v}: {cur} < {prev}"
            );
            prev = cur;
        }
    }

    #[test]
    fn missing_zero_and_negative_share_the_no_data_gray() {
        for m in Metric::ALL {
            assert_eq!(color_for(m, None), NO_DATA);
            assert_eq!(color_for(m, Some(0.0)), NO_DATA);
            assert_eq!(color_for(m, Some(-3.0)), NO_DATA);
            assert_eq!(color_for(m, Some(f64::NAN)), NO_DATA);
        }
    }

    #[test]
    fn no_data_gray_is_not_a_ramp_color() {
        let d = thresholds(Metric::PerGdp);
        for i in 1..=50 {
            let v = d[0] + (d[3] - d[0]) * (i as f64 / 50.0);
            assert_ne!(color_for(Metric::PerGdp, Some(v)), NO_DATA);
        }
    }

    #[test]
    fn values_past_the_last_threshold_keep_darkening_then_saturate() {
        let at_end = color_for(Metric::PerCapita, Some(10.0));
        let beyond = color_for(Metric::PerCapita, Some(40.0));
        assert!(intensity(beyond) >= intensity(at_end));
    }

    #[test]
    fn continent_palette_keys_on_first_seen_order() {
        let rec = |continent: &str| EmissionRecord {
            continent: continent.into(),
            country: "X".into(),
            country_code: "1".into(),
            emissions: Some(1.0),
            per_capita: None,
            per_gdp: None,
            region: String::new(),
            year: 2000,
        };
        let rows = [rec("Asia"), rec("Europe"), rec("Asia"), rec("Africa")];
        let colors = continent_color(rows.iter());
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], ("Asia".into(), CONTINENT_PALETTE[0]));
        assert_eq!(colors[1], ("Europe".into(), CONTINENT_PALETTE[1]));
        assert_eq!(colors[2], ("Africa".into(), CONTINENT_PALETTE[2]));
    }
}
