//! build-panel: builds the merged GVC/emissions table from the raw sources.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use gvc_emissions::config::PipelineConfig;
use gvc_emissions::data::aggregate::{nation_summary, rank_by_emissions, Order};
use gvc_emissions::data::filter::{filtered_indices, PanelFilter};
use gvc_emissions::data::loader::load_file;
use gvc_emissions::pipeline::run_pipeline;

#[derive(Parser)]
#[command(name = "build-panel")]
#[command(about = "Reshape CO2 emissions and GVC participation into one panel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the merged table
    Run {
        /// Pipeline YAML file (defaults apply to missing keys)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emissions workbook (overrides config)
        #[arg(long)]
        emissions: Option<PathBuf>,

        /// Participation CSV (overrides config)
        #[arg(long)]
        participation: Option<PathBuf>,

        /// Output file; the extension picks xlsx, csv or parquet (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarise a merged table written by `run`
    Inspect {
        /// Merged table (.xlsx, .csv or .parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Year of the emissions ranking
        #[arg(long, default_value_t = 2014)]
        year: i32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            emissions,
            participation,
            output,
        } => run(config, emissions, participation, output),
        Commands::Inspect { input, year } => inspect(&input, year),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(
    config_path: Option<PathBuf>,
    emissions: Option<PathBuf>,
    participation: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = PipelineConfig::load(config_path.as_deref())?;
    if let Some(p) = emissions {
        config.emissions_path = p;
    }
    if let Some(p) = participation {
        config.participation_path = p;
    }
    if let Some(p) = output {
        if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.output_dir = dir.to_path_buf();
        } else {
            config.output_dir = PathBuf::from(".");
        }
        if let Some(name) = p.file_name().and_then(|n| n.to_str()) {
            config.output_file = name.to_string();
        }
    }

    let (_, outcome) = run_pipeline(&config)?;

    println!("✓ Panel written to {}", outcome.output.display());
    println!(
        "  Emissions: {} rows across {} countries",
        outcome.emission_rows, outcome.emission_countries
    );
    println!(
        "  Participation: {} source rows, {} merged rows",
        outcome.raw_participation_rows, outcome.merged_rows
    );
    println!(
        "  With emissions: {} ({} without)",
        outcome.matched_rows,
        outcome.merged_rows - outcome.matched_rows
    );
    Ok(())
}

fn inspect(input: &Path, year: i32) -> Result<()> {
    let table = load_file(input)?;

    println!("Merged table {}", input.display());
    println!("======================");
    println!("Rows: {}", table.len());
    println!("Countries: {}", table.countries.len());
    if let (Some(first), Some(last)) = (table.years.first(), table.years.last()) {
        println!("Years: {first}–{last}");
    }
    println!("Industries: {}", table.industries.len());
    println!(
        "Rows with CE: {} ({:.1}%)",
        table.matched(),
        100.0 * table.matched() as f64 / table.len().max(1) as f64
    );

    let in_year = filtered_indices(&table, &PanelFilter::year(year));
    let with_ce = in_year
        .iter()
        .filter(|&&i| table.records[i].ce.is_some())
        .count();
    println!("Rows in {year}: {} ({with_ce} with CE)", in_year.len());

    let nations = nation_summary(&table);
    for (title, order) in [("Top", Order::Top), ("Bottom", Order::Bottom)] {
        println!();
        println!("{title} 5 countries by CO2 emissions, {year}:");
        for (i, n) in rank_by_emissions(&nations, year, 5, order).iter().enumerate() {
            println!(
                "  {}. {}  CE {:.2}  gvc {:.4}",
                i + 1,
                n.country,
                n.ce.unwrap_or(f64::NAN),
                n.average_gvc.unwrap_or(f64::NAN)
            );
        }
    }
    Ok(())
}
