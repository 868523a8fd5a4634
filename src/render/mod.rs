//! Render chart scenes to SVG or PNG files via plotters.
//!
//! The interactive app paints scenes itself; this module is the file path:
//! the CLI's chart export and the GUI's map raster both come through here.
//! The output backend is chosen by the path extension, `.svg` or bitmap.

pub mod fonts;

use crate::charts::bar::{self, BarScene};
use crate::charts::map::{MapScene, HOVER_OPACITY};
use crate::charts::pie::{self, PieScene};
use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontFamily;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

/// Outline for the selected country.
const ACTIVE_STROKE: RGBColor = RGBColor(255, 87, 34);
/// Country borders.
const BORDER: RGBColor = RGBColor(255, 255, 255);

fn is_svg(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("svg")
}

/// Write the map scene to `path`.
pub fn export_map<P: AsRef<Path>>(scene: &MapScene, path: P) -> Result<()> {
    fonts::ensure_registered()?;
    let path = path.as_ref();
    let path_string = path.to_string_lossy().into_owned();
    let size = (scene.width as u32, scene.height as u32);
    if is_svg(path) {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_map(&root, scene)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_map(&root, scene)
    }
}

/// Write the bar scene to `path`.
pub fn export_bar<P: AsRef<Path>>(scene: &BarScene, path: P) -> Result<()> {
    fonts::ensure_registered()?;
    let path = path.as_ref();
    let path_string = path.to_string_lossy().into_owned();
    let size = (scene.width as u32, scene.height as u32);
    if is_svg(path) {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_bar(&root, scene)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_bar(&root, scene)
    }
}

/// Write the pie scene to `path`.
pub fn export_pie<P: AsRef<Path>>(
    scene: &PieScene,
    path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    fonts::ensure_registered()?;
    let path = path.as_ref();
    let path_string = path.to_string_lossy().into_owned();
    if is_svg(path) {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_pie(&root, scene)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_pie(&root, scene)
    }
}

fn draw_map<DB>(root: &DrawingArea<DB, Shift>, scene: &MapScene) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    draw_map_shapes(root, scene, None)?;
    draw_centered_text(root, &scene.title, scene.width / 2.0, 8.0, 24)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Paint only the country fills and borders, no text. The GUI rasters the
/// map through this into a texture and draws its own title, so it never
/// depends on a registered plotters font.
pub fn draw_map_shapes<DB>(
    root: &DrawingArea<DB, Shift>,
    scene: &MapScene,
    hovered: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let px = |ring: &[(f64, f64)]| -> Vec<(i32, i32)> {
        ring.iter()
            .map(|&(x, y)| (x.round() as i32, y.round() as i32))
            .collect()
    };

    for shape in &scene.shapes {
        let dimmed = hovered == Some(shape.code.as_str());
        for polygon in &shape.polygons {
            let outline = px(&polygon.exterior);
            if dimmed {
                // Opacity composites over the white page background.
                root.draw(&Polygon::new(
                    outline.clone(),
                    shape.fill.mix(HOVER_OPACITY).filled(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            } else {
                root.draw(&Polygon::new(outline.clone(), shape.fill.filled()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            for hole in &polygon.holes {
                root.draw(&Polygon::new(px(hole), WHITE.filled()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            let mut border = outline;
            if let Some(first) = border.first().copied() {
                border.push(first);
            }
            let stroke = if shape.active {
                ACTIVE_STROKE.stroke_width(2)
            } else {
                BORDER.stroke_width(1)
            };
            root.draw(&PathElement::new(border, stroke))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}

fn draw_bar<DB>(root: &DrawingArea<DB, Shift>, scene: &BarScene) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (x_lo, x_hi) = scene.x_domain;
    let y_top = if scene.y_max > 0.0 { scene.y_max } else { 1.0 };
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&scene.title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, scene.margins.left as u32)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d((x_lo as f64 - 0.5)..(x_hi as f64 + 0.5), 0.0..y_top)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .y_desc(&scene.y_label)
        .x_labels(((x_hi - x_lo + 1) as usize).min(12))
        .y_labels(10)
        .x_label_formatter(&|x: &f64| format!("{}", x.round() as i32))
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    // Bars are rebuilt in data coordinates; the 1 px padding becomes the
    // matching fraction of a year step.
    let plot_height = (scene.height - scene.margins.top - scene.margins.bottom).max(1.0);
    let pad = bar::BAR_PADDING / bar::x_step(scene.x_domain, scene.width).max(1.0);
    chart
        .draw_series(scene.bars.iter().map(|b| {
            let year = b.year() as f64;
            let value = scene.y_max * b.height / plot_height;
            Rectangle::new(
                [
                    (year - 0.5 + pad / 2.0, 0.0),
                    (year + 0.5 - pad / 2.0, value),
                ],
                b.fill.filled(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, scene: &PieScene) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    for slice in &scene.slices {
        if slice.angle() <= 0.0 {
            continue;
        }
        let outline: Vec<(i32, i32)> = pie::slice_outline(scene, slice, scene.radius)
            .into_iter()
            .map(|(x, y)| (x.round() as i32, y.round() as i32))
            .collect();
        root.draw(&Polygon::new(outline.clone(), slice.fill.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        let mut border = outline;
        if let Some(first) = border.first().copied() {
            border.push(first);
        }
        root.draw(&PathElement::new(border, pie::STROKE.stroke_width(1)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    draw_centered_text(root, &scene.title, scene.cx, 12.0, 24)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_centered_text<DB>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    cx: f64,
    y: f64,
    size: u32,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let style = (FontFamily::SansSerif, size)
        .into_text_style(root)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(text.to_string(), (cx as i32, y as i32), style))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
