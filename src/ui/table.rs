use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use gvc_emissions::data::aggregate::NationYear;

const HEADERS: [&str; 7] = [
    "Country",
    "CO2 Emission",
    "Average GVC",
    "Average GVC Simple",
    "Average GVC Complex",
    "Average Forward",
    "Average Backward",
];

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.4}"),
        _ => "–".to_string(),
    }
}

/// Ranked country rows with their emissions and mean linkages.
pub fn ranking_table(ui: &mut Ui, id: &str, title: &str, rows: &[NationYear]) {
    ui.strong(title);
    if rows.is_empty() {
        ui.label("No countries with emissions in this year.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(60.0))
            .columns(Column::auto().at_least(90.0), HEADERS.len() - 1)
            .header(20.0, |mut header| {
                for h in HEADERS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for n in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(&n.country);
                        });
                        for v in [
                            n.ce,
                            n.average_gvc,
                            n.average_gvcs,
                            n.average_gvcc,
                            n.average_f,
                            n.average_b,
                        ] {
                            row.col(|ui: &mut Ui| {
                                ui.monospace(cell(v));
                            });
                        }
                    });
                }
            });
    });
}
