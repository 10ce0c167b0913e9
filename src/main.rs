use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

mod error;
mod export;
mod heatmap;
mod logging;
mod mapper;
mod models;
mod registry;
mod report;

use heatmap::{IncidentSource, SyntheticIncidents};
use mapper::HeatGridCell;
use registry::Registry;

#[derive(Parser)]
#[command(name = "safety-dashboard")]
#[command(about = "Occupational safety statistics for industrial distribution NAICS codes", long_about = None)]
struct Cli {
    #[arg(long, value_enum, default_value_t = logging::LogFormat::Text, global = true)]
    log_format: logging::LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeriesFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered category codes
    Categories,
    /// Print the stacked injury-rate series for a category
    Series {
        #[arg(long)]
        code: String,
        #[arg(long, value_enum, default_value_t = SeriesFormat::Table)]
        format: SeriesFormat,
    },
    /// Print injury-type slices with percent labels
    Slices {
        #[arg(long)]
        code: String,
    },
    /// Print prevention opportunities with priority badges
    Prevention {
        #[arg(long)]
        code: String,
    },
    /// Print the monthly incident heat map
    Heatmap {
        #[arg(long, default_value_t = heatmap::DEFAULT_SEED)]
        seed: u64,
        /// Observed cells (month,year,incidents,day) instead of synthetic data
        #[arg(long)]
        cells: Option<PathBuf>,
        /// Override the grid maximum used for banding
        #[arg(long)]
        max: Option<u32>,
    },
    /// Show badge styling for a priority label
    Badge {
        #[arg(long)]
        priority: String,
    },
    /// Classify a single count into an intensity band
    Classify {
        #[arg(long)]
        value: u32,
        #[arg(long)]
        max: u32,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        code: String,
        #[arg(long, default_value_t = heatmap::DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        cells: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export every view model for a category as JSON
    Export {
        #[arg(long)]
        code: String,
        #[arg(long, default_value_t = heatmap::DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        cells: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Lint the built-in datasets
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let registry = Registry::builtin();

    match cli.command {
        Commands::Categories => {
            for dataset in registry.categories() {
                println!("{} {}", dataset.code.as_str(), dataset.description);
            }
        }
        Commands::Series { code, format } => {
            let dataset = registry.category(&code)?;
            let series = mapper::to_stacked_series(&dataset.injury_rates);

            match format {
                SeriesFormat::Table => {
                    println!("year  days_away  restricted  other");
                    for point in &series {
                        println!(
                            "{}  {:>9.1}  {:>10.1}  {:>5.1}",
                            point.year, point.days_away, point.restricted, point.other
                        );
                    }
                }
                SeriesFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
                SeriesFormat::Csv => export::series_csv(&series, std::io::stdout().lock())?,
            }
        }
        Commands::Slices { code } => {
            let dataset = registry.category(&code)?;
            for slice in mapper::to_pie_slices(&dataset.injury_types)? {
                println!("{} {} {}", slice.percent_label, slice.color, slice.name);
            }
        }
        Commands::Prevention { code } => {
            let dataset = registry.category(&code)?;
            for category in &dataset.prevention {
                let badge = mapper::badge_style(category.priority);
                println!(
                    "{} [{} Priority] {} {}",
                    category.category, category.priority, badge.background, badge.text
                );
                for opportunity in &category.opportunities {
                    println!("  - {}", opportunity);
                }
            }
        }
        Commands::Heatmap { seed, cells, max } => {
            let source = incident_source(cells.as_deref(), seed)?;
            let grid = match max {
                Some(max) => mapper::heat_grid_with_max(&source.cells(), max)?,
                None => mapper::heat_grid(&source.cells())?,
            };
            println!("Source: {}", source.label());
            print!("{}", report::render_heat_grid(&grid));
        }
        Commands::Badge { priority } => {
            let badge = mapper::badge_style_for(&priority)?;
            println!("{} {}", badge.background, badge.text);
        }
        Commands::Classify { value, max } => {
            let band = mapper::classify_intensity(value, max)?;
            println!("{} {}", band.as_str(), band.color_token());
        }
        Commands::Report {
            code,
            seed,
            cells,
            out,
        } => {
            let dataset = registry.category(&code)?;
            let (label, grid) = build_heat_grid(cells.as_deref(), seed)?;
            let report = report::build_report(
                &registry,
                dataset,
                Some(report::HeatSection {
                    label: &label,
                    cells: &grid,
                }),
                Utc::now().date_naive(),
            )?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(code = %dataset.code, out = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            code,
            seed,
            cells,
            out,
        } => {
            let (source, cells) = build_heat_grid(cells.as_deref(), seed)?;
            let heat = export::HeatView { source, cells };
            let bundle = export::build_bundle(&registry, &code, Some(heat))?;
            let json = export::to_json(&bundle)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(code = %bundle.code, out = %path.display(), "export written");
                    println!("Export written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Check => {
            let warnings = registry.check();
            for warning in &warnings {
                warn!("{warning}");
            }
            println!(
                "{} categories checked, {} warnings.",
                registry.codes().count(),
                warnings.len()
            );
        }
    }

    Ok(())
}

fn incident_source(cells: Option<&Path>, seed: u64) -> anyhow::Result<Box<dyn IncidentSource>> {
    match cells {
        Some(path) => {
            let source = heatmap::load_cells_csv(path)?;
            info!(path = %path.display(), "loaded observed incident cells");
            Ok(Box::new(source))
        }
        None => {
            info!(seed, "using synthetic placeholder incidents");
            Ok(Box::new(SyntheticIncidents::new(seed)))
        }
    }
}

fn build_heat_grid(cells: Option<&Path>, seed: u64) -> anyhow::Result<(String, Vec<HeatGridCell>)> {
    let source = incident_source(cells, seed)?;
    let grid = mapper::heat_grid(&source.cells())?;
    Ok((source.label().to_string(), grid))
}
