use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use gvc_emissions::data::aggregate::{SectorPoint, TrendPoint};
use gvc_emissions::data::classify::Classification;
use gvc_emissions::data::geo::{BoundarySet, ChoroplethRegion};
use gvc_emissions::data::model::Metric;

use crate::color::{classification_color, BlueScale, ColorMap, MISSING};
use crate::state::{LabeledPoint, NationSeries, PanelView};

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

/// Shade each boundary by its value; missing values draw light grey.
pub fn choropleth(ui: &mut Ui, id: &str, regions: &[ChoroplethRegion<'_>], legend_label: &str) {
    let Some(scale) = BlueScale::spanning(regions.iter().filter_map(|r| r.value)) else {
        ui.label("No values to map for this selection.");
        return;
    };
    let outline = Stroke::new(0.5, Color32::DARK_GRAY);

    Plot::new(id)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .height(ui.available_height() * 0.6)
        .show(ui, |plot_ui| {
            for region in regions {
                let fill = scale.color_for(region.value);
                for ring in &region.boundary.polygons {
                    let poly = Polygon::new(PlotPoints::from(ring.clone()))
                        .fill_color(fill)
                        .stroke(outline);
                    plot_ui.polygon(poly);
                }
            }
        });

    scale_legend(ui, &scale, legend_label);
}

fn scale_legend(ui: &mut Ui, scale: &BlueScale, label: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        for (v, c) in scale.legend(5) {
            ui.label(RichText::new("■").color(c));
            ui.small(format!("{v:.3}"));
        }
        ui.label(RichText::new("■").color(MISSING));
        ui.small("No Data");
    });
}

/// World map of `values` over the member states, optionally cut to Europe.
pub fn country_map(
    ui: &mut Ui,
    id: &str,
    boundaries: Option<&BoundarySet>,
    values: &std::collections::HashMap<String, f64>,
    legend_label: &str,
) {
    match boundaries {
        Some(b) => choropleth(ui, id, &b.choropleth(values), legend_label),
        None => {
            ui.label("Load a boundary file (File → Open boundaries…) to draw maps.");
        }
    }
}

// ---------------------------------------------------------------------------
// Nation level scatter
// ---------------------------------------------------------------------------

/// Metric vs CE per selected country, with a least-squares trend line.
pub fn nation_scatter(ui: &mut Ui, series: &[NationSeries], colors: &ColorMap) {
    Plot::new("nation_scatter")
        .legend(Legend::default())
        .x_axis_label("GVC Participation")
        .y_axis_label("Total CO2 Emissions")
        .show(ui, |plot_ui| {
            for s in series {
                let color = colors.color_for(&s.country);
                plot_ui.points(
                    Points::new(PlotPoints::from(s.points.clone()))
                        .name(&s.country)
                        .color(color.gamma_multiply(0.7))
                        .radius(4.0)
                        .filled(true),
                );
                if let Some((slope, intercept)) = s.fit {
                    let xs = s.points.iter().map(|p| p[0]);
                    let lo = xs.clone().fold(f64::INFINITY, f64::min);
                    let hi = xs.fold(f64::NEG_INFINITY, f64::max);
                    let line: PlotPoints = [lo, hi]
                        .iter()
                        .map(|&x| [x, slope * x + intercept])
                        .collect();
                    plot_ui.line(
                        Line::new(line)
                            .name(format!("{} Trend", s.country))
                            .color(color)
                            .width(1.5),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Industry level scatter
// ---------------------------------------------------------------------------

/// Participation vs CE for one classification; highlighted countries are
/// labelled.
pub fn industry_scatter(ui: &mut Ui, class: Classification, points: &[LabeledPoint]) {
    ui.strong(class.name());
    let xy: Vec<[f64; 2]> = points.iter().map(|p| p.point).collect();

    Plot::new(("industry_scatter", class))
        .x_axis_label("Participation")
        .y_axis_label("Total CO2 Emission")
        .include_x(0.0)
        .include_x(1.0)
        .height(ui.available_height().max(160.0))
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(xy))
                    .color(classification_color(class))
                    .radius(3.5)
                    .filled(true),
            );
            for p in points.iter().filter(|p| p.highlighted) {
                plot_ui.text(
                    Text::new(PlotPoint::new(p.point[0], p.point[1]), &p.country)
                        .anchor(Align2::RIGHT_BOTTOM)
                        .color(Color32::BLACK),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Exploratory figures
// ---------------------------------------------------------------------------

/// Figure 1: forward (or backward) participation over time per country.
pub fn trend_plot(ui: &mut Ui, metric: Metric, trend: &[TrendPoint], colors: &ColorMap) {
    let mut countries: Vec<&str> = trend.iter().map(|t| t.country.as_str()).collect();
    countries.dedup();

    Plot::new(("trend_plot", metric))
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(format!("{} Index", metric.label()))
        .include_y(0.0)
        .include_y(0.35)
        .height(260.0)
        .show(ui, |plot_ui| {
            for country in countries {
                let pts: Vec<[f64; 2]> = trend
                    .iter()
                    .filter(|t| t.country == country)
                    .map(|t| {
                        let v = if metric == Metric::Backward { t.backward } else { t.forward };
                        [t.year as f64, v]
                    })
                    .collect();
                let color = colors.color_for(country);
                plot_ui.line(Line::new(PlotPoints::from(pts.clone())).name(country).color(color));
                plot_ui.points(Points::new(PlotPoints::from(pts)).color(color).radius(3.0));
            }
        });
}

/// The b = f reference line.
const DIAGONAL: [[f64; 2]; 2] = [[0.0, 0.0], [1.0, 1.0]];
const DIAGONAL_COLOR: Color32 = Color32::from_rgb(0xFF, 0xA5, 0x00);

/// Figure 2: cross-country sector means coloured by classification.
pub fn sector_scatter(ui: &mut Ui, sectors: &[SectorPoint]) {
    Plot::new("sector_scatter")
        .legend(Legend::default())
        .x_axis_label("Average Backward-Linkage")
        .y_axis_label("Average Forward-Linkage")
        .data_aspect(1.0)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(1.0)
        .height(360.0)
        .show(ui, |plot_ui| {
            for class in Classification::ALL {
                let pts: Vec<[f64; 2]> = sectors
                    .iter()
                    .filter(|s| s.classification == class)
                    .map(|s| [s.backward, s.forward])
                    .collect();
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .name(class.name())
                        .color(classification_color(class))
                        .radius(4.5)
                        .filled(true),
                );
            }
            plot_ui.line(
                Line::new(PlotPoints::from(DIAGONAL.to_vec()))
                    .color(DIAGONAL_COLOR)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

/// Figures 3 and 4: per-country means over one industry selection, with the
/// configured countries labelled.
pub fn panel_scatter(ui: &mut Ui, id: &str, panel: &PanelView, x_label: &str, y_label: &str) {
    ui.strong(&panel.title);
    let xy: Vec<[f64; 2]> = panel.points.iter().map(|p| [p.x, p.y]).collect();

    Plot::new((id, panel.title.as_str()))
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .data_aspect(1.0)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(1.0)
        .height(240.0)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(xy))
                    .color(Color32::BLACK)
                    .radius(2.5),
            );
            for p in panel.points.iter().filter(|p| panel.labels.contains(&p.country)) {
                plot_ui.text(
                    Text::new(PlotPoint::new(p.x, p.y), &p.country)
                        .anchor(Align2::LEFT_BOTTOM)
                        .color(Color32::DARK_GREEN),
                );
            }
            plot_ui.line(
                Line::new(PlotPoints::from(DIAGONAL.to_vec()))
                    .color(DIAGONAL_COLOR)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

/// Placeholder shown in the central panel before any table is loaded.
pub fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a merged table to start  (File → Open table…)");
    });
}

/// Heading with consistent spacing.
pub fn section(ui: &mut Ui, title: &str) {
    ui.add_space(6.0);
    ui.heading(title);
    ui.separator();
}
