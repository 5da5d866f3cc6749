use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use gvc_emissions::data::model::Metric;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – input widgets
// ---------------------------------------------------------------------------

/// Render the controls of the active tab.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Inputs");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No table loaded.");
        return;
    };
    let countries: Vec<String> = table.countries.iter().cloned().collect();
    let (first_year, last_year) = state.year_bounds();

    // Widgets edit a copy; the state refreshes once if anything moved.
    let mut next = state.selections.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Geo => {
                ui.strong("Year");
                ui.add(egui::Slider::new(&mut next.geo_year, first_year..=last_year));
                ui.small("CO2 emissions summed over detailed sectors.");
            }
            Tab::Nation => {
                for (i, slot) in next.nation_countries.iter_mut().enumerate() {
                    ui.strong(format!("Country {}", i + 1));
                    egui::ComboBox::from_id_salt(("nation_country", i))
                        .selected_text(slot.as_str())
                        .show_ui(ui, |ui: &mut Ui| {
                            for c in &countries {
                                ui.selectable_value(slot, c.clone(), c);
                            }
                        });
                }
                ui.separator();
                metric_choice(ui, &mut next.nation_metric);
            }
            Tab::Industry => {
                ui.strong("Year");
                ui.add(egui::Slider::new(&mut next.industry_year, first_year..=last_year));
                ui.separator();
                metric_choice(ui, &mut next.industry_metric);
            }
            Tab::Explore => {
                ui.strong("Cross-section year");
                ui.add(egui::Slider::new(&mut next.figure_year, first_year..=last_year));
                ui.small("Applies to figures 2 to 6.");
            }
        });

    state.update_selections(next);
}

fn metric_choice(ui: &mut Ui, metric: &mut Metric) {
    ui.strong("GVC participation");
    for choice in Metric::PARTICIPATION_CHOICES {
        ui.radio_value(metric, choice, choice.label());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open table…").clicked() {
                open_table_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows, {} countries, {} with emissions",
                table.len(),
                table.countries.len(),
                table.matched()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_table_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open merged panel")
        .add_filter("Supported files", &["xlsx", "xls", "ods", "csv", "parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_table(&path) {
            state.report("Failed to load table", e);
        }
    }
}

pub fn open_boundaries_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_boundaries(&path) {
            state.report("Failed to load boundaries", e);
        }
    }
}
