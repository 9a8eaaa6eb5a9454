use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::ColorMap;
use crate::data::filter::PieSlice;
use crate::data::model::SiteFilter;
use crate::state::DashboardState;

/// Arc segments used for a full circle.
const CIRCLE_SEGMENTS: f64 = 96.0;

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

pub fn pie_title(site: &SiteFilter) -> String {
    match site {
        SiteFilter::All => "Total Success Launches by Site".to_string(),
        SiteFilter::Site(s) => format!("Total Success Launches for Site {s}"),
    }
}

pub fn scatter_title(site: &SiteFilter) -> String {
    match site {
        SiteFilter::All => "Correlation between Payload and Success for all Sites".to_string(),
        SiteFilter::Site(s) => format!("Correlation between Payload and Success for Site {s}"),
    }
}

// ---------------------------------------------------------------------------
// Pie geometry
// ---------------------------------------------------------------------------

/// Angular extent of one pie slice, in radians, counter-clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub label: String,
    pub fraction: f64,
    pub start: f64,
    pub sweep: f64,
}

/// Lay slices out around the circle in order. Zero-valued slices get a zero
/// sweep; an all-zero input yields no wedges.
pub fn pie_layout(slices: &[PieSlice]) -> Vec<Wedge> {
    let sum: usize = slices.iter().map(|s| s.count).sum();
    if sum == 0 {
        return Vec::new();
    }
    let mut start = 0.0;
    slices
        .iter()
        .map(|s| {
            let fraction = s.count as f64 / sum as f64;
            let wedge = Wedge {
                label: s.label.clone(),
                fraction,
                start,
                sweep: fraction * TAU,
            };
            start += wedge.sweep;
            wedge
        })
        .collect()
}

fn unit_point(angle: f64) -> [f64; 2] {
    // Angle 0 is 12 o'clock.
    [angle.sin(), angle.cos()]
}

/// Convex polygons covering a wedge of the unit circle.
///
/// Plot polygons are filled as convex shapes, so the wedge is cut into
/// pieces no wider than a quarter turn.
pub fn wedge_polygons(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    if sweep <= 0.0 {
        return Vec::new();
    }
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f64;
    let steps = ((piece_sweep / TAU) * CIRCLE_SEGMENTS).ceil().max(1.0) as usize;

    (0..pieces)
        .map(|p| {
            let a0 = start + p as f64 * piece_sweep;
            let mut points = Vec::with_capacity(steps + 2);
            points.push([0.0, 0.0]);
            points.extend((0..=steps).map(|k| unit_point(a0 + piece_sweep * k as f64 / steps as f64)));
            points
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Success pie
// ---------------------------------------------------------------------------

/// Render the success pie for the current site selection.
pub fn success_pie(ui: &mut Ui, state: &DashboardState, height: f32) {
    let site = &state.selection.site;
    ui.strong(pie_title(site));

    let wedges = pie_layout(&state.pie);
    if wedges.is_empty() {
        empty_hint(ui, height, pie_hint(state.dataset.is_some(), &state.pie));
        return;
    }

    let outcome_colors;
    let colors = match site {
        SiteFilter::All => &state.site_colors,
        SiteFilter::Site(_) => {
            outcome_colors = ColorMap::from_ordered(["0", "1"]);
            &outcome_colors
        }
    };

    Plot::new("success_pie")
        .height(height)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| {
            for wedge in &wedges {
                let color = colors.color_for(&wedge.label);
                for poly in wedge_polygons(wedge.start, wedge.sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(poly))
                            .name(&wedge.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }
                if wedge.fraction > 0.0 {
                    let [x, y] = unit_point(wedge.start + wedge.sweep / 2.0);
                    plot_ui.text(Text::new(
                        PlotPoint::new(x * 0.65, y * 0.65),
                        RichText::new(format!("{:.1}%", wedge.fraction * 100.0))
                            .color(Color32::BLACK)
                            .strong(),
                    ));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Payload scatter
// ---------------------------------------------------------------------------

/// Render payload mass against outcome class, coloured by booster category.
pub fn payload_scatter(ui: &mut Ui, state: &DashboardState, height: f32) {
    ui.strong(scatter_title(&state.selection.site));

    let records = state.scatter_records();
    if records.is_empty() {
        empty_hint(ui, height, scatter_hint(state.dataset.is_some()));
        return;
    }

    let mut by_booster: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for r in &records {
        by_booster
            .entry(r.booster_version_category.as_str())
            .or_default()
            .push([r.payload_mass_kg, f64::from(r.outcome.class())]);
    }

    Plot::new("payload_scatter")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Payload Mass (kg)")
        .y_axis_label("class")
        .include_y(-0.5)
        .include_y(1.5)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (category, points) in by_booster {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(category)
                        .color(state.booster_colors.color_for(category))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(4.0),
                );
            }
        });
}

const NO_DATA_HINT: &str = "Open a file to view launches  (File → Open…)";
const NO_MATCH_HINT: &str = "No launches match the current selection";
const NO_SUCCESS_HINT: &str = "No successful launches for the current selection";

/// Text shown instead of a pie with nothing to draw. Slices that are all
/// zero mean launches matched but none succeeded.
pub fn pie_hint(has_dataset: bool, slices: &[PieSlice]) -> &'static str {
    if !has_dataset {
        NO_DATA_HINT
    } else if slices.is_empty() {
        NO_MATCH_HINT
    } else {
        NO_SUCCESS_HINT
    }
}

pub fn scatter_hint(has_dataset: bool) -> &'static str {
    if has_dataset { NO_MATCH_HINT } else { NO_DATA_HINT }
}

fn empty_hint(ui: &mut Ui, height: f32, text: &str) {
    ui.allocate_ui(eframe::egui::vec2(ui.available_width(), height), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(text);
        });
    });
}
