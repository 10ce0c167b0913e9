//! Monthly incident sources for the heat grid.
//!
//! No real incident feed exists yet. [`SyntheticIncidents`] produces seeded
//! placeholder data so the grid is reproducible; [`FixedIncidents`] carries
//! observed (or test) cells.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{DashboardError, Result};
use crate::models::HeatCell;

pub const DEFAULT_SEED: u64 = 423_830;

/// Cell days stay within 1..=28 so every month has them.
const MAX_DAY: u32 = 28;

pub trait IncidentSource {
    fn label(&self) -> &str;
    fn cells(&self) -> Vec<HeatCell>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticYear {
    pub year: i32,
    pub max_incidents: u32,
}

#[derive(Debug, Clone)]
pub struct SyntheticIncidents {
    seed: u64,
    years: Vec<SyntheticYear>,
}

impl SyntheticIncidents {
    pub fn new(seed: u64) -> Self {
        Self::with_years(
            seed,
            vec![
                SyntheticYear {
                    year: 2023,
                    max_incidents: 8,
                },
                SyntheticYear {
                    year: 2024,
                    max_incidents: 6,
                },
            ],
        )
    }

    pub fn with_years(seed: u64, years: Vec<SyntheticYear>) -> Self {
        Self { seed, years }
    }
}

impl Default for SyntheticIncidents {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl IncidentSource for SyntheticIncidents {
    fn label(&self) -> &str {
        "synthetic placeholder"
    }

    fn cells(&self) -> Vec<HeatCell> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut cells = Vec::with_capacity(self.years.len() * 12);

        for spec in &self.years {
            for month in 1..=12 {
                cells.push(HeatCell {
                    month,
                    year: spec.year,
                    incidents: rng.gen_range(1..=spec.max_incidents.max(1)),
                    day: rng.gen_range(1..=MAX_DAY),
                });
            }
        }

        cells
    }
}

#[derive(Debug, Clone)]
pub struct FixedIncidents {
    cells: Vec<HeatCell>,
}

impl FixedIncidents {
    pub fn new(cells: Vec<HeatCell>) -> Result<Self> {
        for cell in &cells {
            validate_cell(cell)?;
        }
        Ok(Self { cells })
    }
}

impl IncidentSource for FixedIncidents {
    fn label(&self) -> &str {
        "observed"
    }

    fn cells(&self) -> Vec<HeatCell> {
        self.cells.clone()
    }
}

/// Load observed cells from a CSV file with `month,year,incidents,day` columns.
pub fn load_cells_csv(path: &Path) -> anyhow::Result<FixedIncidents> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut cells = Vec::new();

    for (index, result) in reader.deserialize::<HeatCell>().enumerate() {
        let cell = result.with_context(|| format!("bad heat cell row {}", index + 1))?;
        cells.push(cell);
    }

    Ok(FixedIncidents::new(cells)?)
}

fn validate_cell(cell: &HeatCell) -> Result<()> {
    if cell.day == 0 || cell.day > MAX_DAY {
        return Err(DashboardError::precondition(format!(
            "heat cell day {} outside 1..={MAX_DAY}",
            cell.day
        )));
    }

    NaiveDate::from_ymd_opt(cell.year, cell.month, cell.day)
        .map(|_| ())
        .ok_or_else(|| {
            DashboardError::precondition(format!(
                "heat cell {}-{} is not a valid month",
                cell.year, cell.month
            ))
        })
}
