use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Six-digit NAICS industry code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryCode(String);

impl CategoryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One year of incident rates per 100 full-time-equivalent workers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryYearRecord {
    pub year: i32,
    pub days_away: f64,
    pub restricted: f64,
    pub other: f64,
}

impl InjuryYearRecord {
    /// Total recordable rate.
    pub fn total(&self) -> f64 {
        self.days_away + self.restricted + self.other
    }

    /// Days away, restricted or transferred.
    pub fn dart(&self) -> f64 {
        self.days_away + self.restricted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjuryTypeSlice {
    pub name: String,
    pub value: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyPartCase {
    pub name: String,
    pub cases: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            other => Err(DashboardError::precondition(format!(
                "unknown priority {other:?}, expected High or Medium"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreventionCategory {
    pub category: String,
    pub priority: Priority,
    pub opportunities: Vec<String>,
}

/// Monthly incident observation for the heat grid. Never stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub month: u32,
    pub year: i32,
    pub incidents: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDataset {
    pub code: CategoryCode,
    pub description: String,
    pub injury_rates: Vec<InjuryYearRecord>,
    pub injury_types: Vec<InjuryTypeSlice>,
    pub prevention: Vec<PreventionCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfile {
    pub name: String,
    pub total_employees: u32,
    pub locations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum TargetComparison {
    Below(f64),
    Above(f64),
    Exactly(f64),
    AtMostDays(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetUnit {
    Rate,
    Percent,
    Ratio,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiTarget {
    pub group: String,
    pub name: String,
    pub comparison: TargetComparison,
    pub unit: TargetUnit,
    pub basis: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ActivityCadence {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl ActivityCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCadence::Daily => "Daily",
            ActivityCadence::Weekly => "Weekly",
            ActivityCadence::Monthly => "Monthly",
            ActivityCadence::Quarterly => "Quarterly",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledActivities {
    pub cadence: ActivityCadence,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitTier {
    pub name: String,
    pub frequency: String,
    pub sites: u32,
    pub visits_per_site_per_year: f64,
    pub out_of_state: bool,
}

/// Out-of-state coverage area, e.g. Pacific Northwest.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageRegion {
    pub region: String,
    pub cities: Vec<String>,
    pub sites: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedVisit {
    pub site: String,
    pub cycle: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitMonth {
    pub year: i32,
    pub month: u32,
    pub visits: Vec<PlannedVisit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Deliverable {
    pub name: String,
    pub due: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSource {
    pub agency: String,
    pub label: String,
    pub url: String,
}
