use eframe::egui::{self, ScrollArea, Ui};

use gvc_emissions::data::classify::Classification;
use gvc_emissions::data::geo::BoundingBox;
use gvc_emissions::data::model::Metric;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct GvcDashboardApp {
    pub state: AppState,
}

impl GvcDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for GvcDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: inputs ----
        egui::SidePanel::left("input_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_none() {
                plot::empty_hint(ui);
                return;
            }
            match self.state.tab {
                Tab::Geo => geo_tab(ui, &self.state),
                Tab::Nation => nation_tab(ui, &self.state),
                Tab::Industry => industry_tab(ui, &self.state),
                Tab::Explore => explore_tab(ui, &self.state),
            }
        });
    }
}

fn geo_tab(ui: &mut Ui, state: &AppState) {
    let year = state.selections.geo_year;
    plot::section(ui, &format!("CO2 Emissions by Country, {year}"));
    plot::country_map(
        ui,
        "geo_map",
        state.boundaries.as_ref(),
        &state.views.geo_values,
        "CO2 Emission",
    );

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        table::ranking_table(
            ui,
            "top_table",
            "Top 5 countries by CO2 emissions",
            &state.views.top,
        );
        ui.add_space(8.0);
        table::ranking_table(
            ui,
            "bottom_table",
            "Bottom 5 countries by CO2 emissions",
            &state.views.bottom,
        );
    });
}

fn nation_tab(ui: &mut Ui, state: &AppState) {
    let metric = state.selections.nation_metric;
    plot::section(ui, &format!("{} vs CO2 Emissions", metric.label()));
    plot::nation_scatter(ui, &state.views.nation_series, &state.country_colors);
}

fn industry_tab(ui: &mut Ui, state: &AppState) {
    let s = &state.selections;
    plot::section(
        ui,
        &format!("{} vs CO2 Emissions by Sector, {}", s.industry_metric.label(), s.industry_year),
    );

    let views = &state.views.industry;
    let cell = |ui: &mut Ui, class: Classification| {
        let points = views.get(&class).map(Vec::as_slice).unwrap_or_default();
        plot::industry_scatter(ui, class, points);
    };
    let height = (ui.available_height() / 2.0 - 24.0).max(180.0);
    for pair in Classification::ALL.chunks(2) {
        ui.columns(pair.len(), |cols: &mut [Ui]| {
            for (col, &class) in cols.iter_mut().zip(pair) {
                col.set_height(height);
                cell(col, class);
            }
        });
    }
}

fn explore_tab(ui: &mut Ui, state: &AppState) {
    let views = &state.views;
    let year = state.selections.figure_year;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            plot::section(ui, "Figure 1: GVC participation over time");
            ui.columns(2, |cols: &mut [Ui]| {
                plot::trend_plot(&mut cols[0], Metric::Forward, &views.trend, &state.country_colors);
                plot::trend_plot(&mut cols[1], Metric::Backward, &views.trend, &state.country_colors);
            });

            plot::section(ui, &format!("Figure 2: Sector average linkages, {year}"));
            plot::sector_scatter(ui, &views.sectors);

            plot::section(ui, &format!("Figure 3: Forward vs backward linkages, {year}"));
            panel_grid(ui, "linkage_panel", &views.linkage_panels, "Backward", "Forward");

            plot::section(ui, &format!("Figure 4: Simple vs complex participation, {year}"));
            panel_grid(ui, "complexity_panel", &views.complexity_panels, "Complex", "Simple");

            plot::section(ui, &format!("Figure 5: GVC participation by country, {year}"));
            plot::country_map(
                ui,
                "gvc_world",
                state.boundaries.as_ref(),
                &views.gvc_by_country,
                "GVC",
            );

            plot::section(ui, &format!("Figure 6: GVC participation in Europe, {year}"));
            let europe = state
                .boundaries
                .as_ref()
                .map(|b| b.within_bounds(&BoundingBox::EUROPE));
            plot::country_map(ui, "gvc_europe", europe.as_ref(), &views.gvc_by_country, "GVC");
        });
}

fn panel_grid(
    ui: &mut Ui,
    id: &str,
    panels: &[crate::state::PanelView],
    x_label: &str,
    y_label: &str,
) {
    for pair in panels.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, panel) in cols.iter_mut().zip(pair) {
                plot::panel_scatter(col, id, panel, x_label, y_label);
            }
        });
    }
}
