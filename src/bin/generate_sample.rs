//! Writes a small synthetic input set into `data/` (or the first argument):
//! an emissions workbook, a participation CSV and a boundary GeoJSON.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use serde_json::json;

use gvc_emissions::config::{DEFAULT_AGGREGATE_SECTORS, DEFAULT_COUNTRIES};
use gvc_emissions::data::classify::{sector_code, Classification};

const INDUSTRIES: usize = 56;
const SHEET_YEARS: std::ops::RangeInclusive<i32> = 1995..=2016;
const PANEL_YEARS: std::ops::RangeInclusive<i32> = 2000..=2014;

/// Rough (lon, lat) centres used to place each country's square.
const CENTRES: [(&str, f64, f64); 42] = [
    ("AUS", 134.0, -25.0),
    ("AUT", 14.5, 47.5),
    ("BEL", 4.5, 50.8),
    ("BGR", 25.5, 42.7),
    ("BRA", -51.9, -14.2),
    ("CAN", -106.3, 56.1),
    ("CHE", 8.2, 46.8),
    ("CHN", 104.2, 35.9),
    ("CYP", 33.4, 35.1),
    ("CZE", 15.5, 49.8),
    ("DEU", 10.4, 51.2),
    ("DNK", 9.5, 56.3),
    ("ESP", -3.7, 40.5),
    ("EST", 25.0, 58.6),
    ("FIN", 25.7, 61.9),
    ("FRA", 2.2, 46.2),
    ("GBR", -3.4, 55.4),
    ("GRC", 21.8, 39.1),
    ("HRV", 15.2, 45.1),
    ("HUN", 19.5, 47.2),
    ("IDN", 113.9, -0.8),
    ("IND", 78.9, 20.6),
    ("IRL", -8.2, 53.4),
    ("ITA", 12.6, 41.9),
    ("JPN", 138.3, 36.2),
    ("KOR", 127.8, 35.9),
    ("LTU", 23.9, 55.2),
    ("LUX", 6.1, 49.8),
    ("LVA", 24.6, 56.9),
    ("MEX", -102.6, 23.6),
    ("MLT", 14.4, 35.9),
    ("NOR", 8.5, 60.5),
    ("POL", 19.1, 51.9),
    ("PRT", -8.2, 39.4),
    ("ROU", 24.9, 45.9),
    ("RUS", 105.3, 61.5),
    ("SVK", 19.7, 48.7),
    ("SVN", 14.9, 46.2),
    ("SWE", 18.6, 60.1),
    ("TUR", 35.2, 39.0),
    ("TWN", 121.0, 23.7),
    ("USA", -95.7, 37.1),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Emissions scale of a sector; manufacturing and mining dominate.
fn sector_weight(industry: &str) -> f64 {
    match Classification::from_industry(industry) {
        Some(Classification::Mining) => 40.0,
        Some(Classification::Manufacturing) => 25.0,
        Some(Classification::Agriculture) => 12.0,
        Some(Classification::Service) | None => 4.0,
    }
}

fn write_emissions(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut workbook = Workbook::new();
    for (i, country) in DEFAULT_COUNTRIES.iter().enumerate() {
        let size = 1.0 + (i % 7) as f64 * 3.0;
        let sheet = workbook.add_worksheet();
        sheet.set_name(*country)?;
        sheet.write_string(0, 0, "Code")?;
        sheet.write_string(0, 1, "Description")?;
        for (c, year) in SHEET_YEARS.enumerate() {
            sheet.write_number(0, c as u16 + 2, year as f64)?;
        }
        for n in 1..=INDUSTRIES {
            let code = sector_code(n);
            let row = n as u32;
            sheet.write_string(row, 0, &code)?;
            sheet.write_string(row, 1, format!("Industry {code}"))?;
            let base = sector_weight(&code) * size * rng.uniform(0.5, 1.5);
            for (c, year) in SHEET_YEARS.enumerate() {
                let growth = 1.0 + 0.02 * (year - 1995) as f64;
                // Leave the odd blank cell, as the real workbook does.
                if rng.next_f64() < 0.01 {
                    continue;
                }
                sheet.write_number(row, c as u16 + 2, base * growth * rng.uniform(0.9, 1.1))?;
            }
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn linkage_row(rng: &mut SimpleRng) -> [f64; 6] {
    let fs = rng.uniform(0.02, 0.25);
    let fc = rng.uniform(0.01, 0.15);
    let bs = rng.uniform(0.02, 0.25);
    let bc = rng.uniform(0.01, 0.15);
    let f = fs + fc + rng.uniform(0.0, 0.05);
    let b = bs + bc + rng.uniform(0.0, 0.05);
    [f, fs, fc, b, bs, bc]
}

fn write_participation(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record([
        "", "region", "sector", "year", "GVCpt_f", "GVCpt_f_s", "GVCpt_f_c", "GVCpt_b",
        "GVCpt_b_s", "GVCpt_b_c",
    ])?;

    let regions = DEFAULT_COUNTRIES.iter().copied().chain(["NLD", "ROW"]);
    let regions: Vec<&str> = regions.collect();
    let mut index = 0usize;
    for year in PANEL_YEARS {
        for country in &regions {
            let detailed = (1..=INDUSTRIES).map(|n| {
                let code = sector_code(n);
                (format!("{country}{code}"), format!("{code} Industry"))
            });
            let aggregates = DEFAULT_AGGREGATE_SECTORS
                .iter()
                .map(|s| (country.to_string(), s.to_string()));
            for (region, sector) in detailed.chain(aggregates) {
                let values = linkage_row(rng);
                let mut record = vec![
                    index.to_string(),
                    region,
                    sector,
                    year.to_string(),
                ];
                record.extend(values.iter().map(|v| format!("{v:.6}")));
                wtr.write_record(&record)?;
                index += 1;
            }
        }
    }
    wtr.flush()?;
    Ok(index)
}

fn write_boundaries(path: &Path) -> Result<()> {
    let mut features: Vec<serde_json::Value> = CENTRES
        .iter()
        .map(|&(iso3, lon, lat)| {
            let h = if (-10.0..=40.0).contains(&lon) && lat > 34.0 { 1.5 } else { 6.0 };
            json!({
                "type": "Feature",
                "properties": {"iso3": iso3, "name": iso3, "status": "Member State"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lon - h, lat - h], [lon + h, lat - h],
                        [lon + h, lat + h], [lon - h, lat + h],
                        [lon - h, lat - h]
                    ]]
                }
            })
        })
        .collect();
    features.push(json!({
        "type": "Feature",
        "properties": {"iso3": "GRL", "name": "Greenland", "status": "Territory"},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-50.0, 68.0], [-30.0, 68.0], [-30.0, 78.0], [-50.0, 78.0], [-50.0, 68.0]]]
        }
    }));

    let collection = json!({"type": "FeatureCollection", "features": features});
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(serde_json::to_string_pretty(&collection)?.as_bytes())?;
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let emissions = dir.join("CO2 emissions.xlsx");
    write_emissions(&emissions, &mut rng)?;
    println!(
        "Wrote {} country sheets ({} industries, {}–{}) to {}",
        DEFAULT_COUNTRIES.len(),
        INDUSTRIES,
        SHEET_YEARS.start(),
        SHEET_YEARS.end(),
        emissions.display()
    );

    let participation = dir.join("GVCpt_WIOD2016.csv");
    let rows = write_participation(&participation, &mut rng)?;
    println!("Wrote {rows} participation rows to {}", participation.display());

    let boundaries = dir.join("boundaries.geojson");
    write_boundaries(&boundaries)?;
    println!("Wrote {} boundaries to {}", CENTRES.len() + 1, boundaries.display());
    Ok(())
}
