/*!
 * GUI dashboard for co2view-rs.
 *
 * Three synchronized views over one emissions dataset:
 * - a choropleth world map colored by the selected metric,
 * - a per-country bar chart filtered by map clicks,
 * - a per-year pie chart of absolute emissions by continent.
 *
 * A year slider and a metric radio group drive all three; hovering any mark
 * shows the shared tooltip. Scenes come from the library's pure chart
 * builders; this binary only paints them and feeds events back through the
 * dispatcher.
 */

use co2view_rs::charts::ease::lerp;
use co2view_rs::charts::{bar, map, pie, HoverTarget};
use co2view_rs::{render, tooltip, Dataset, Dispatcher, Event, Metric, SelectionState};
use eframe::egui;
use egui::{Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use plotters::prelude::IntoDrawingArea;
use plotters::style::RGBColor;
use plotters_bitmap::BitMapBackend;

const MAP_W: f32 = 900.0;
const MAP_H: f32 = 600.0;
const BAR_W: f32 = MAP_W / 1.05;
const BAR_H: f32 = MAP_H / 1.4;
const PIE_W: f32 = 900.0;
const PIE_H: f32 = 600.0;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 780.0])
            .with_min_inner_size([720.0, 540.0])
            .with_title("CO2 Emissions Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "CO2 Emissions Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(DashApp::new()))),
    )
}

fn color32(c: RGBColor) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

/// Per-slice radius animation state for the pie hover effect.
struct SliceAnim {
    from: f64,
    target: f64,
    start: f64,
}

/// Everything that exists only after a successful load.
struct Loaded {
    data: Dataset,
    state: SelectionState,
    dispatcher: Dispatcher,

    map_scene: map::MapScene,
    bar_scene: bar::BarScene,
    pie_scene: pie::PieScene,

    // Map fill transitions render as a crossfade between the previous and
    // current raster; geometry never moves, so blending the images equals
    // blending each country's fill.
    map_texture: Option<egui::TextureHandle>,
    prev_map_texture: Option<egui::TextureHandle>,
    map_transition_start: Option<f64>,
    /// Country code baked into the current raster as hover-dimmed.
    map_hover_code: Option<String>,

    /// When the current bar scene started animating in.
    bar_anim_start: f64,
    /// Previous geometry by year, so an update transitions from the old
    /// height instead of the baseline.
    bar_from: Vec<(i32, f32, f32)>,
    /// Bars leaving the chart, still shrinking.
    bar_exit: Vec<bar::Bar>,
    bar_exit_start: f64,

    pie_anim: Vec<SliceAnim>,
    hovered_slice: Option<usize>,
}

struct DashApp {
    geometry_path: String,
    csv_path: String,
    error_message: String,
    loaded: Option<Loaded>,
}

impl DashApp {
    fn new() -> Self {
        Self {
            geometry_path: String::new(),
            csv_path: String::new(),
            error_message: String::new(),
            loaded: None,
        }
    }

    fn load(&mut self, now: f64) {
        match Dataset::load(&self.geometry_path, &self.csv_path) {
            Ok(mut data) => {
                let (min_year, _) = data.year_extent();
                let state = SelectionState::new(min_year);
                data.attach_year(state.selected_year);

                let map_scene =
                    map::update(&data.features, &state, MAP_W as f64, MAP_H as f64);
                let mut bar_scene = bar::update(
                    &data.records,
                    state.selected_metric,
                    "",
                    BAR_W as f64,
                    BAR_H as f64,
                );
                bar::highlight(&mut bar_scene, state.selected_year);
                let pie_scene = pie::update(
                    &data.records,
                    state.selected_year,
                    PIE_W as f64,
                    PIE_H as f64,
                );
                let pie_anim = resting_anim(&pie_scene, now);

                let dispatcher = Dispatcher::new(data.year_extent());
                self.error_message.clear();
                self.loaded = Some(Loaded {
                    data,
                    state,
                    dispatcher,
                    map_scene,
                    bar_scene,
                    pie_scene,
                    map_texture: None,
                    prev_map_texture: None,
                    map_transition_start: None,
                    map_hover_code: None,
                    bar_anim_start: now,
                    bar_from: Vec::new(),
                    bar_exit: Vec::new(),
                    bar_exit_start: now,
                    pie_anim,
                    hovered_slice: None,
                });
            }
            Err(err) => {
                self.error_message = format!("Failed to load dataset: {err}");
                self.loaded = None;
            }
        }
    }
}

fn resting_anim(scene: &pie::PieScene, now: f64) -> Vec<SliceAnim> {
    scene
        .slices
        .iter()
        .map(|_| SliceAnim {
            from: scene.radius,
            target: scene.radius,
            start: now,
        })
        .collect()
}

impl Loaded {
    /// Re-render the map raster, optionally starting a crossfade from the
    /// previous one.
    fn rebuild_map_texture(&mut self, ctx: &egui::Context, now: f64, transition: bool) {
        let (w, h) = (MAP_W as u32, MAP_H as u32);
        let mut buf = vec![255u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            if let Err(err) =
                render::draw_map_shapes(&root, &self.map_scene, self.map_hover_code.as_deref())
            {
                log::warn!("map raster failed: {err}");
                return;
            }
            if let Err(err) = root.present() {
                log::warn!("map raster failed: {err:?}");
                return;
            }
        }
        let image = egui::ColorImage::from_rgb([w as usize, h as usize], &buf);
        let texture = ctx.load_texture("map", image, egui::TextureOptions::LINEAR);
        if transition {
            self.prev_map_texture = self.map_texture.take();
            self.map_transition_start = Some(now);
        }
        self.map_texture = Some(texture);
    }

    /// Rebuild the bar scene, capturing the old geometry so update bars
    /// animate from their previous heights and removed bars shrink away.
    fn rebuild_bars(&mut self, now: f64) {
        let country = self
            .state
            .selected_country
            .clone()
            .unwrap_or_default();
        let mut next = bar::update(
            &self.data.records,
            self.state.selected_metric,
            &country,
            BAR_W as f64,
            BAR_H as f64,
        );
        bar::highlight(&mut next, self.state.selected_year);

        self.bar_from = self
            .bar_scene
            .bars
            .iter()
            .map(|b| (b.year(), b.y as f32, b.height as f32))
            .collect();
        let surviving: Vec<i32> = next.bars.iter().map(|b| b.year()).collect();
        self.bar_exit = self
            .bar_scene
            .bars
            .iter()
            .filter(|b| !surviving.contains(&b.year()))
            .cloned()
            .collect();
        // Exit stagger runs in reverse index order.
        let n = self.bar_exit.len();
        for (i, b) in self.bar_exit.iter_mut().enumerate() {
            b.delay_ms = ((n - i - 1) as u32) * bar::STAGGER_MS;
        }
        self.bar_exit_start = now;
        self.bar_anim_start = now;
        self.bar_scene = next;
    }

    fn rebuild_pie(&mut self, now: f64) {
        self.pie_scene = pie::update(
            &self.data.records,
            self.state.selected_year,
            PIE_W as f64,
            PIE_H as f64,
        );
        self.pie_anim = resting_anim(&self.pie_scene, now);
        self.hovered_slice = None;
    }

    fn apply(&mut self, ctx: &egui::Context, now: f64, event: Event) {
        let refresh = self.dispatcher.apply(&mut self.state, event);
        if refresh.map {
            self.data.attach_year(self.state.selected_year);
            self.map_scene = map::update(
                &self.data.features,
                &self.state,
                MAP_W as f64,
                MAP_H as f64,
            );
            self.rebuild_map_texture(ctx, now, true);
        }
        if refresh.pie {
            self.rebuild_pie(now);
        }
        if refresh.bar {
            self.rebuild_bars(now);
        }
        if refresh.bar_highlight {
            bar::highlight(&mut self.bar_scene, self.state.selected_year);
        }
    }
}

impl eframe::App for DashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Geometry:");
                ui.text_edit_singleline(&mut self.geometry_path);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("GeoJSON", &["geojson", "json"])
                        .pick_file()
                {
                    self.geometry_path = path.to_string_lossy().to_string();
                }
                ui.label("CSV:");
                ui.text_edit_singleline(&mut self.csv_path);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("CSV", &["csv"])
                        .pick_file()
                {
                    self.csv_path = path.to_string_lossy().to_string();
                }
                if ui.button("Load").clicked() {
                    self.load(now);
                }
            });

            if !self.error_message.is_empty() {
                ui.colored_label(Color32::RED, &self.error_message);
            }

            let mut event = None;
            if let Some(loaded) = &mut self.loaded {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let (min_year, max_year) = loaded.data.year_extent();
                    let mut year = loaded.state.selected_year;
                    let slider = ui.add(egui::Slider::new(&mut year, min_year..=max_year));
                    if slider.changed() {
                        event = Some(Event::YearChanged(year));
                    }
                    ui.label(format!("Year: {}", loaded.state.selected_year));
                    ui.separator();

                    let mut metric = loaded.state.selected_metric;
                    for m in Metric::ALL {
                        ui.radio_value(&mut metric, m, m.label());
                    }
                    if metric != loaded.state.selected_metric {
                        event = Some(Event::MetricChanged(metric));
                    }
                    ui.separator();
                    ui.label(format!(
                        "Country: {}",
                        loaded.state.selected_country.as_deref().unwrap_or("")
                    ));
                });
                ui.add_space(4.0);
            }
            if let (Some(loaded), Some(event)) = (&mut self.loaded, event) {
                loaded.apply(ctx, now, event);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(loaded) = &mut self.loaded else {
                ui.centered_and_justified(|ui| {
                    ui.label("Pick a geometry document and an emissions CSV, then press Load.");
                });
                return;
            };

            if loaded.map_texture.is_none() {
                loaded.rebuild_map_texture(ctx, now, false);
            }

            let mut hovered: Option<(HoverTarget, Pos2)> = None;
            let mut clicked_country: Option<String> = None;
            let mut animating = false;

            egui::ScrollArea::both().show(ui, |ui| {
                show_map(ui, ctx, loaded, now, &mut hovered, &mut clicked_country, &mut animating);
                ui.add_space(16.0);
                show_bars(ui, loaded, now, &mut hovered, &mut animating);
                ui.add_space(16.0);
                show_pie(ui, loaded, now, &mut hovered, &mut animating);
            });

            if let Some(country) = clicked_country {
                loaded.apply(ctx, now, Event::CountryClicked(country));
            }

            if let Some((target, pointer)) = hovered {
                show_tooltip(ctx, loaded, &target, pointer);
            }
            if animating {
                ctx.request_repaint();
            }
        });
    }
}

fn show_map(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    loaded: &mut Loaded,
    now: f64,
    hovered: &mut Option<(HoverTarget, Pos2)>,
    clicked_country: &mut Option<String>,
    animating: &mut bool,
) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(&loaded.map_scene.title).size(20.0));
    });
    let (response, painter) =
        ui.allocate_painter(Vec2::new(MAP_W, MAP_H), Sense::click());
    let rect = response.rect;
    let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));

    // Crossfade the previous raster into the current one.
    let blend = loaded
        .map_transition_start
        .map(|start| {
            loaded
                .map_scene
                .fill_transition
                .progress((now - start) * 1000.0, 0.0)
        })
        .unwrap_or(1.0);
    if blend < 1.0 {
        *animating = true;
        if let Some(prev) = &loaded.prev_map_texture {
            painter.image(prev.id(), rect, uv, Color32::WHITE);
        }
        if let Some(cur) = &loaded.map_texture {
            let alpha = (blend * 255.0).round() as u8;
            painter.image(cur.id(), rect, uv, Color32::from_white_alpha(alpha));
        }
    } else {
        loaded.map_transition_start = None;
        loaded.prev_map_texture = None;
        if let Some(cur) = &loaded.map_texture {
            painter.image(cur.id(), rect, uv, Color32::WHITE);
        }
    }

    // Hit-test in scene coordinates.
    let hover_code = response.hover_pos().and_then(|pos| {
        let local = pos - rect.min;
        map::hit(&loaded.map_scene, local.x as f64, local.y as f64).map(|shape| {
            *hovered = Some((HoverTarget::Map(shape.datum.clone()), pos));
            if response.clicked() {
                *clicked_country = Some(shape.datum.country.clone());
            }
            shape.code.clone()
        })
    });
    if hover_code != loaded.map_hover_code {
        loaded.map_hover_code = hover_code;
        loaded.rebuild_map_texture(ctx, now, false);
    }
}

fn show_bars(
    ui: &mut egui::Ui,
    loaded: &mut Loaded,
    now: f64,
    hovered: &mut Option<(HoverTarget, Pos2)>,
    animating: &mut bool,
) {
    let scene = &loaded.bar_scene;
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(&scene.title).size(20.0));
    });
    let (response, painter) = ui.allocate_painter(Vec2::new(BAR_W, BAR_H), Sense::hover());
    let rect = response.rect;
    let origin = rect.min;
    let to_screen = |x: f64, y: f64| Pos2::new(origin.x + x as f32, origin.y + y as f32);

    painter.rect_filled(rect, 0.0, Color32::WHITE);

    let baseline = scene.height - scene.margins.bottom;
    let axis_color = Color32::from_gray(60);
    let step = bar::x_step(scene.x_domain, scene.width);

    // X axis with year ticks.
    painter.line_segment(
        [
            to_screen(scene.margins.left - step / 2.0, baseline),
            to_screen(scene.width - scene.margins.right, baseline),
        ],
        Stroke::new(1.0, axis_color),
    );
    for (x, label) in bar::x_ticks(scene) {
        painter.line_segment(
            [to_screen(x, baseline), to_screen(x, baseline + 4.0)],
            Stroke::new(1.0, axis_color),
        );
        painter.text(
            to_screen(x, baseline + 6.0),
            egui::Align2::CENTER_TOP,
            label,
            FontId::proportional(11.0),
            axis_color,
        );
    }

    // Y axis, shifted left by half a bar like the dashboard's.
    let axis_x = scene.margins.left - step / 2.0;
    painter.line_segment(
        [
            to_screen(axis_x, scene.margins.top),
            to_screen(axis_x, baseline),
        ],
        Stroke::new(1.0, axis_color),
    );
    for (y, label) in bar::y_ticks(scene) {
        painter.line_segment(
            [to_screen(axis_x - 4.0, y), to_screen(axis_x, y)],
            Stroke::new(1.0, axis_color),
        );
        painter.text(
            to_screen(axis_x - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            label,
            FontId::proportional(11.0),
            axis_color,
        );
    }

    // Rotated Y axis unit label.
    let galley = painter.layout_no_wrap(
        scene.y_label.clone(),
        FontId::proportional(13.0),
        axis_color,
    );
    let label_pos = to_screen(12.0, (baseline + scene.margins.top) / 2.0 + galley.size().x as f64 / 2.0);
    painter.add(
        egui::epaint::TextShape::new(label_pos, galley, axis_color)
            .with_angle(-std::f32::consts::FRAC_PI_2),
    );

    let elapsed_ms = (now - loaded.bar_anim_start) * 1000.0;
    let from_height = |year: i32| -> Option<(f32, f32)> {
        loaded
            .bar_from
            .iter()
            .find(|(y, _, _)| *y == year)
            .map(|&(_, y0, h0)| (y0, h0))
    };

    for b in &scene.bars {
        let p = scene.enter.progress(elapsed_ms, b.delay_ms as f64);
        if p < 1.0 {
            *animating = true;
        }
        let (y0, h0) = from_height(b.year()).unwrap_or((baseline as f32, 0.0));
        let y = lerp(y0 as f64, b.y, p);
        let h = lerp(h0 as f64, b.height, p);
        let top = to_screen(b.x, y);
        painter.rect_filled(
            Rect::from_min_size(top, Vec2::new(b.width as f32, h as f32)),
            0.0,
            color32(b.fill),
        );
    }

    // Bars on their way out shrink back to the baseline.
    let exit_elapsed = (now - loaded.bar_exit_start) * 1000.0;
    loaded.bar_exit.retain(|b| {
        let p = scene.enter.progress(exit_elapsed, b.delay_ms as f64);
        if p >= 1.0 {
            return false;
        }
        *animating = true;
        let y = lerp(b.y, baseline, p);
        let h = lerp(b.height, 0.0, p);
        painter.rect_filled(
            Rect::from_min_size(
                to_screen(b.x, y),
                Vec2::new(b.width as f32, h as f32),
            ),
            0.0,
            color32(b.fill),
        );
        true
    });

    if let Some(pos) = response.hover_pos() {
        let local = pos - origin;
        if let Some(b) = bar::hit(scene, local.x as f64, local.y as f64) {
            *hovered = Some((HoverTarget::Bar(b.datum.clone()), pos));
        }
    }
}

fn show_pie(
    ui: &mut egui::Ui,
    loaded: &mut Loaded,
    now: f64,
    hovered: &mut Option<(HoverTarget, Pos2)>,
    animating: &mut bool,
) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(&loaded.pie_scene.title).size(20.0));
    });
    let (response, painter) = ui.allocate_painter(Vec2::new(PIE_W, PIE_H), Sense::hover());
    let rect = response.rect;
    let origin = rect.min;

    painter.rect_filled(rect, 0.0, Color32::WHITE);

    // Resolve hover first so radii animate toward the right targets. A
    // grown slice keeps its hover out to the full radius.
    let scene = &loaded.pie_scene;
    let acquire_radius = if loaded.hovered_slice.is_some() {
        scene.hover_radius
    } else {
        scene.radius
    };
    let hover_index = response.hover_pos().and_then(|pos| {
        let local = pos - origin;
        pie::hit_index(scene, local.x as f64, local.y as f64, acquire_radius).map(|idx| {
            *hovered = Some((HoverTarget::Pie(scene.slices[idx].datum.clone()), pos));
            idx
        })
    });

    if hover_index != loaded.hovered_slice {
        for (i, anim) in loaded.pie_anim.iter_mut().enumerate() {
            let target = if hover_index == Some(i) {
                scene.hover_radius
            } else {
                scene.radius
            };
            if anim.target != target {
                let p = scene.hover.progress((now - anim.start) * 1000.0, 0.0);
                anim.from = lerp(anim.from, anim.target, p);
                anim.target = target;
                anim.start = now;
            }
        }
        loaded.hovered_slice = hover_index;
    }

    for (i, slice) in scene.slices.iter().enumerate() {
        if slice.angle() <= 0.0 {
            continue;
        }
        let anim = &loaded.pie_anim[i];
        let p = scene.hover.progress((now - anim.start) * 1000.0, 0.0);
        if p < 1.0 {
            *animating = true;
        }
        let radius = lerp(anim.from, anim.target, p);
        let outline: Vec<Pos2> = pie::slice_outline(scene, slice, radius)
            .into_iter()
            .map(|(x, y)| Pos2::new(origin.x + x as f32, origin.y + y as f32))
            .collect();

        // Fan of thin quads; each is convex even though the slice is not.
        let center = outline[0];
        let fill = color32(slice.fill);
        for pair in outline[1..].windows(2) {
            painter.add(egui::Shape::convex_polygon(
                vec![center, pair[0], pair[1]],
                fill,
                Stroke::NONE,
            ));
        }

        let is_hovered = loaded.hovered_slice == Some(i);
        let stroke = if is_hovered {
            Stroke::new(
                pie::HOVER_STROKE_WIDTH as f32,
                color32(pie::HOVER_STROKE),
            )
        } else {
            Stroke::new(0.5, color32(pie::STROKE))
        };
        painter.add(egui::Shape::closed_line(outline, stroke));
    }
}

fn show_tooltip(ctx: &egui::Context, loaded: &Loaded, target: &HoverTarget, pointer: Pos2) {
    let content = tooltip::content(
        target,
        loaded.state.selected_metric,
        loaded.state.selected_year,
    );

    // Measure, then anchor centered above the pointer.
    let font = FontId::proportional(13.0);
    let (mut w, mut h) = (0.0f32, 6.0f32);
    ctx.fonts(|f| {
        for line in &content.lines {
            let galley = f.layout_no_wrap(line.clone(), font.clone(), Color32::BLACK);
            w = w.max(galley.size().x);
            h += galley.size().y + 2.0;
        }
    });
    w += 16.0;
    let (x, y) = tooltip::position(
        (pointer.x as f64, pointer.y as f64),
        (w as f64, h as f64),
    );

    egui::Area::new(egui::Id::new("mark-tooltip"))
        .fixed_pos(Pos2::new(x as f32, y as f32))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                for line in &content.lines {
                    ui.label(egui::RichText::new(line).font(font.clone()));
                }
            });
        });
}
