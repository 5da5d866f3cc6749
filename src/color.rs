use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use gvc_emissions::data::classify::Classification;

/// Fill for regions without data.
pub const MISSING: Color32 = Color32::LIGHT_GRAY;

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps labels (country codes, series names) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let labels: Vec<&String> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(l, c)| (l.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// Fixed colours of the industry-level scatters.
pub fn classification_color(class: Classification) -> Color32 {
    match class {
        Classification::Agriculture => Color32::from_rgb(0xFF, 0x99, 0x99),
        Classification::Manufacturing => Color32::from_rgb(0x99, 0xCC, 0xFF),
        Classification::Service => Color32::from_rgb(0xFF, 0xCC, 0x99),
        Classification::Mining => Color32::from_rgb(0xCC, 0x99, 0xFF),
    }
}

// ---------------------------------------------------------------------------
// Sequential scale for choropleths
// ---------------------------------------------------------------------------

/// Light-to-dark blue ramp over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlueScale {
    pub min: f64,
    pub max: f64,
}

impl BlueScale {
    /// Scale spanning the finite values; `None` when there are none.
    pub fn spanning<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<BlueScale>, v| match acc {
                None => Some(BlueScale { min: v, max: v }),
                Some(s) => Some(BlueScale {
                    min: s.min.min(v),
                    max: s.max.max(v),
                }),
            })
    }

    pub fn color_for(&self, value: Option<f64>) -> Color32 {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return MISSING;
        };
        let range = self.max - self.min;
        let t = if range.abs() < f64::EPSILON {
            1.0
        } else {
            ((v - self.min) / range).clamp(0.0, 1.0)
        };
        let lightness = 0.95 - 0.65 * t as f32;
        hsl_to_color32(Hsl::new(212.0, 0.7, lightness))
    }

    /// `n` evenly spaced (value, colour) stops for a legend.
    pub fn legend(&self, n: usize) -> Vec<(f64, Color32)> {
        let steps = n.max(2);
        (0..steps)
            .map(|i| {
                let v = self.min + (self.max - self.min) * i as f64 / (steps - 1) as f64;
                (v, self.color_for(Some(v)))
            })
            .collect()
    }
}
