use std::collections::BTreeMap;

use crate::error::{DashboardError, Result};
use crate::models::{
    ActivityCadence, BodyPartCase, CategoryCode, CategoryDataset, CompanyProfile, CoverageRegion,
    DataSource, Deliverable, InjuryTypeSlice, InjuryYearRecord, KpiTarget, PlannedVisit,
    PreventionCategory, Priority, ScheduledActivities, TargetComparison, TargetUnit, VisitMonth,
    VisitTier,
};

/// Read-only collection of every dataset the dashboard displays, keyed by
/// category code. Built once; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    profile: CompanyProfile,
    categories: BTreeMap<CategoryCode, CategoryDataset>,
    body_parts: Vec<BodyPartCase>,
    kpis: Vec<KpiTarget>,
    schedule: Vec<ScheduledActivities>,
    visit_plan: Vec<VisitTier>,
    coverage: Vec<CoverageRegion>,
    calendar: Vec<VisitMonth>,
    objectives: Vec<String>,
    deliverables: Vec<Deliverable>,
    sources: Vec<DataSource>,
}

impl Registry {
    pub fn new(profile: CompanyProfile) -> Self {
        Self {
            profile,
            categories: BTreeMap::new(),
            body_parts: Vec::new(),
            kpis: Vec::new(),
            schedule: Vec::new(),
            visit_plan: Vec::new(),
            coverage: Vec::new(),
            calendar: Vec::new(),
            objectives: Vec::new(),
            deliverables: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_category(mut self, dataset: CategoryDataset) -> Self {
        self.categories.insert(dataset.code.clone(), dataset);
        self
    }

    pub fn with_body_parts(mut self, body_parts: Vec<BodyPartCase>) -> Self {
        self.body_parts = body_parts;
        self
    }

    /// Canonical data for NAICS 423830 and 423840, from the BLS Survey of
    /// Occupational Injuries and Illnesses industry tables.
    pub fn builtin() -> Self {
        let mut registry = Registry::new(CompanyProfile {
            name: "Motion Industries".to_string(),
            total_employees: 9000,
            locations: 550,
        })
        .with_category(machinery_dataset())
        .with_category(supplies_dataset())
        .with_body_parts(body_part_cases());

        registry.kpis = kpi_targets();
        registry.schedule = activity_schedule();
        registry.visit_plan = visit_plan();
        registry.coverage = coverage_regions();
        registry.calendar = visit_calendar();
        registry.objectives = visit_objectives();
        registry.deliverables = visit_deliverables();
        registry.sources = data_sources();
        registry
    }

    pub fn category(&self, code: &str) -> Result<&CategoryDataset> {
        self.categories
            .get(&CategoryCode::new(code.trim()))
            .ok_or_else(|| DashboardError::NotFound {
                entity: "category",
                key: code.to_string(),
            })
    }

    pub fn codes(&self) -> impl Iterator<Item = &CategoryCode> {
        self.categories.keys()
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryDataset> {
        self.categories.values()
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn body_parts(&self) -> &[BodyPartCase] {
        &self.body_parts
    }

    pub fn kpis(&self) -> &[KpiTarget] {
        &self.kpis
    }

    pub fn schedule(&self) -> &[ScheduledActivities] {
        &self.schedule
    }

    pub fn visit_plan(&self) -> &[VisitTier] {
        &self.visit_plan
    }

    pub fn coverage(&self) -> &[CoverageRegion] {
        &self.coverage
    }

    pub fn calendar(&self) -> &[VisitMonth] {
        &self.calendar
    }

    pub fn objectives(&self) -> &[String] {
        &self.objectives
    }

    pub fn deliverables(&self) -> &[Deliverable] {
        &self.deliverables
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    /// Advisory data lint. Findings are warnings only; the data stays usable.
    pub fn check(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for dataset in self.categories.values() {
            let total: u32 = dataset.injury_types.iter().map(|slice| slice.value).sum();
            if total > 100 {
                warnings.push(format!(
                    "{}: injury type values sum to {} (above 100)",
                    dataset.code, total
                ));
            }

            for pair in dataset.injury_rates.windows(2) {
                if pair[1].year <= pair[0].year {
                    warnings.push(format!(
                        "{}: rate series not ordered by year ({} then {})",
                        dataset.code, pair[0].year, pair[1].year
                    ));
                }
            }

            if dataset.prevention.iter().any(|c| c.opportunities.is_empty()) {
                warnings.push(format!(
                    "{}: prevention category without opportunities",
                    dataset.code
                ));
            }
        }

        if !self.coverage.is_empty() {
            let covered: u32 = self.coverage.iter().map(|region| region.sites).sum();
            let planned: u32 = self
                .visit_plan
                .iter()
                .filter(|tier| tier.out_of_state)
                .map(|tier| tier.sites)
                .sum();
            if covered != planned {
                warnings.push(format!(
                    "coverage regions list {covered} out-of-state sites, visit plan has {planned}"
                ));
            }
        }

        for month in &self.calendar {
            if !(1..=12).contains(&month.month) {
                warnings.push(format!(
                    "visit calendar month {} outside 1..=12",
                    month.month
                ));
            }
        }

        warnings
    }
}

fn rates(rows: &[(i32, f64, f64, f64)]) -> Vec<InjuryYearRecord> {
    rows.iter()
        .map(|&(year, days_away, restricted, other)| InjuryYearRecord {
            year,
            days_away,
            restricted,
            other,
        })
        .collect()
}

fn slices(rows: &[(&str, u32, &str)]) -> Vec<InjuryTypeSlice> {
    rows.iter()
        .map(|&(name, value, color)| InjuryTypeSlice {
            name: name.to_string(),
            value,
            color: color.to_string(),
        })
        .collect()
}

fn prevention(category: &str, priority: Priority, opportunities: &[&str]) -> PreventionCategory {
    PreventionCategory {
        category: category.to_string(),
        priority,
        opportunities: opportunities.iter().map(|s| s.to_string()).collect(),
    }
}

fn machinery_dataset() -> CategoryDataset {
    CategoryDataset {
        code: CategoryCode::new("423830"),
        description: "Industrial Machinery and Equipment Merchant Wholesalers".to_string(),
        injury_rates: rates(&[
            (2020, 1.3, 1.2, 0.8),
            (2021, 1.2, 1.1, 0.7),
            (2022, 1.1, 1.3, 0.7),
            (2023, 1.0, 1.2, 0.7),
        ]),
        injury_types: slices(&[
            ("Strains/Sprains/Tears", 35, "#dc2626"),
            ("Cuts/Lacerations", 22, "#ea580c"),
            ("Bruises/Contusions", 14, "#d97706"),
            ("Fractures", 11, "#ca8a04"),
            ("Falls/Slips/Trips", 10, "#eab308"),
            ("Other", 8, "#f59e0b"),
        ]),
        prevention: vec![
            prevention(
                "Heavy Machinery Safety",
                Priority::High,
                &[
                    "Implement automated material handling systems for heavy equipment",
                    "Install proximity sensors on industrial machinery",
                    "Develop machinery-specific safety protocols and training",
                    "Regular maintenance scheduling for heavy equipment",
                ],
            ),
            prevention(
                "Cut & Laceration Prevention",
                Priority::High,
                &[
                    "Upgrade to Level A5 cut-resistant gloves for equipment handling",
                    "Install advanced blade guards on cutting machinery",
                    "Implement comprehensive lockout/tagout procedures",
                    "Regular blade inspection and replacement programs",
                ],
            ),
            prevention(
                "Ergonomic Solutions",
                Priority::High,
                &[
                    "Install pneumatic lifting aids for heavy machinery parts",
                    "Provide adjustable workstations for equipment assembly",
                    "Conduct ergonomic assessments for repetitive lifting tasks",
                    "Implement job rotation for physically demanding roles",
                ],
            ),
            prevention(
                "Safety Culture Enhancement",
                Priority::Medium,
                &[
                    "Monthly machinery safety meetings with case studies",
                    "Near-miss reporting system with incentives",
                    "Safety champion programs for each department",
                    "Regular safety audits with employee participation",
                ],
            ),
        ],
    }
}

fn supplies_dataset() -> CategoryDataset {
    CategoryDataset {
        code: CategoryCode::new("423840"),
        description: "Industrial Supplies Merchant Wholesalers".to_string(),
        injury_rates: rates(&[
            (2020, 1.1, 1.0, 0.8),
            (2021, 1.0, 0.9, 0.7),
            (2022, 0.9, 1.1, 0.7),
            (2023, 0.8, 1.0, 0.7),
        ]),
        injury_types: slices(&[
            ("Strains/Sprains/Tears", 33, "#dc2626"),
            ("Cuts/Lacerations", 18, "#ea580c"),
            ("Bruises/Contusions", 16, "#d97706"),
            ("Falls/Slips/Trips", 12, "#ca8a04"),
            ("Fractures", 9, "#eab308"),
            ("Other", 12, "#f59e0b"),
        ]),
        prevention: vec![
            prevention(
                "Warehouse Safety",
                Priority::High,
                &[
                    "Implement automated storage and retrieval systems",
                    "Install motion-activated lighting in storage areas",
                    "Develop supply-specific handling procedures",
                    "Regular warehouse layout optimization for safety",
                ],
            ),
            prevention(
                "Material Handling Safety",
                Priority::High,
                &[
                    "Upgrade to cut-resistant gloves for small parts handling",
                    "Install ergonomic lifting aids for supply distribution",
                    "Implement proper packaging protocols to prevent cuts",
                    "Regular tool maintenance and safety inspections",
                ],
            ),
            prevention(
                "Slip, Trip & Fall Prevention",
                Priority::Medium,
                &[
                    "Improve lighting throughout warehouse and storage areas",
                    "Implement comprehensive housekeeping protocols",
                    "Install non-slip surfaces in high-traffic zones",
                    "Clear marking of walkways and hazardous storage areas",
                ],
            ),
            prevention(
                "Training & Communication",
                Priority::High,
                &[
                    "Weekly supply safety meetings with trend analysis",
                    "Digital near-miss reporting system implementation",
                    "Safety incentive programs tailored to supply operations",
                    "Quarterly safety audits with continuous improvement focus",
                ],
            ),
        ],
    }
}

fn body_part_cases() -> Vec<BodyPartCase> {
    [
        ("Back", 28),
        ("Hand/Fingers", 22),
        ("Shoulder", 15),
        ("Knee", 12),
        ("Ankle/Foot", 10),
        ("Arm/Elbow", 8),
        ("Other", 5),
    ]
    .into_iter()
    .map(|(name, cases)| BodyPartCase {
        name: name.to_string(),
        cases,
    })
    .collect()
}

fn kpi_targets() -> Vec<KpiTarget> {
    let safety = "Safety Performance Metrics";
    let operational = "Operational Excellence Metrics";
    let targets = vec![
        (
            safety,
            "Total Recordable Incident Rate (TRIR)",
            TargetComparison::Below(2.0),
            TargetUnit::Rate,
            "Per 100 FTE annually",
        ),
        (
            safety,
            "Days Away/Restricted/Transfer (DART)",
            TargetComparison::Below(1.0),
            TargetUnit::Rate,
            "Per 100 FTE annually",
        ),
        (
            safety,
            "Near Miss Reporting Rate",
            TargetComparison::Above(5.0),
            TargetUnit::Ratio,
            "Near miss to injury ratio",
        ),
        (
            safety,
            "Safety Training Completion",
            TargetComparison::Exactly(100.0),
            TargetUnit::Percent,
            "Within 30 days of assignment",
        ),
        (
            operational,
            "Safety Audit Score",
            TargetComparison::Above(95.0),
            TargetUnit::Percent,
            "Monthly audit compliance",
        ),
        (
            operational,
            "PPE Compliance Rate",
            TargetComparison::Exactly(100.0),
            TargetUnit::Percent,
            "Daily compliance observations",
        ),
        (
            operational,
            "Safety Meeting Attendance",
            TargetComparison::Above(90.0),
            TargetUnit::Percent,
            "Weekly team meetings",
        ),
        (
            operational,
            "Corrective Action Closure",
            TargetComparison::AtMostDays(30),
            TargetUnit::Rate,
            "Average closure time",
        ),
    ];

    targets
        .into_iter()
        .map(|(group, name, comparison, unit, basis)| KpiTarget {
            group: group.to_string(),
            name: name.to_string(),
            comparison,
            unit,
            basis: basis.to_string(),
        })
        .collect()
}

fn activity_schedule() -> Vec<ScheduledActivities> {
    let rows: [(ActivityCadence, &[&str]); 4] = [
        (
            ActivityCadence::Daily,
            &[
                "Safety walkthrough inspections",
                "Equipment safety checks",
                "Housekeeping assessments",
                "Incident reporting review",
                "PPE compliance monitoring",
            ],
        ),
        (
            ActivityCadence::Weekly,
            &[
                "Team safety meetings",
                "Near-miss analysis",
                "Training needs assessment",
                "Emergency equipment checks",
                "KPI data collection",
                "Wed 2:00 PM PT: Western U.S. Region KPI Review Call",
            ],
        ),
        (
            ActivityCadence::Monthly,
            &[
                "Comprehensive safety audits",
                "Ergonomic assessments",
                "Safety training delivery",
                "KPI trend analysis",
                "Corrective action reviews",
                "Safety champion recognition",
            ],
        ),
        (
            ActivityCadence::Quarterly,
            &[
                "Emergency drill execution",
                "Safety culture surveys",
                "Leadership safety tours",
                "Contractor safety reviews",
                "Equipment maintenance audits",
                "Regional best practice sharing",
            ],
        ),
    ];

    rows.into_iter()
        .map(|(cadence, activities)| ScheduledActivities {
            cadence,
            activities: activities.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

fn visit_plan() -> Vec<VisitTier> {
    [
        ("Utah Sites (Local)", "Monthly", 6, 2.0, false),
        ("Major Out-of-State Centers", "Quarterly", 6, 4.0, true),
        ("Regional Facilities", "Annually", 10, 1.0, true),
        ("Smaller Sites", "Every 3 Years", 6, 1.0 / 3.0, true),
    ]
    .into_iter()
    .map(|(name, frequency, sites, rate, out_of_state)| VisitTier {
        name: name.to_string(),
        frequency: frequency.to_string(),
        sites,
        visits_per_site_per_year: rate,
        out_of_state,
    })
    .collect()
}

fn coverage_regions() -> Vec<CoverageRegion> {
    let rows: [(&str, &[&str], u32); 5] = [
        ("Northern California", &["Oakland", "Sacramento", "San Jose"], 6),
        ("Pacific Northwest", &["Portland", "Seattle", "Tacoma"], 5),
        ("Southwest", &["Phoenix", "Las Vegas", "Albuquerque"], 4),
        ("Mountain West", &["Denver", "Boise", "Reno"], 4),
        ("Other Western Markets", &["Fresno", "Tucson", "Spokane"], 3),
    ];

    rows.into_iter()
        .map(|(region, cities, sites)| CoverageRegion {
            region: region.to_string(),
            cities: cities.iter().map(|c| c.to_string()).collect(),
            sites,
        })
        .collect()
}

fn visit_calendar() -> Vec<VisitMonth> {
    let rows: [(u32, &[(&str, &str)]); 9] = [
        (
            1,
            &[
                ("Oakland DC", "Quarterly"),
                ("Reno, NV", "Annual"),
                ("Boise, ID", "3-year cycle"),
            ],
        ),
        (2, &[("Portland DC", "Quarterly"), ("Phoenix, AZ", "Annual")]),
        (
            3,
            &[
                ("SLC Hub", "Quarterly"),
                ("Denver, CO", "Annual"),
                ("Las Vegas, NV", "3-year cycle"),
            ],
        ),
        (4, &[("Seattle Hub", "Quarterly"), ("Sacramento, CA", "Annual")]),
        (
            5,
            &[
                ("San Jose, CA", "Annual"),
                ("Tucson, AZ", "Annual"),
                ("Spokane, WA", "3-year cycle"),
            ],
        ),
        (
            6,
            &[("Tacoma, WA", "Annual"), ("Colorado Springs, CO", "Annual")],
        ),
        (
            7,
            &[
                ("Oakland DC", "Quarterly"),
                ("Fresno, CA", "Annual"),
                ("Eugene, OR", "3-year cycle"),
            ],
        ),
        (8, &[("Portland DC", "Quarterly"), ("Albuquerque, NM", "Annual")]),
        (9, &[("SLC Hub", "Quarterly"), ("Provo, UT", "Annual")]),
    ];

    rows.into_iter()
        .map(|(month, visits)| VisitMonth {
            year: 2025,
            month,
            visits: visits
                .iter()
                .map(|&(site, cycle)| PlannedVisit {
                    site: site.to_string(),
                    cycle: cycle.to_string(),
                })
                .collect(),
        })
        .collect()
}

fn visit_objectives() -> Vec<String> {
    [
        "Conduct comprehensive EHS audit and gap analysis",
        "Review KPI performance and trend analysis with site lead",
        "Assess implementation of prevention opportunities",
        "Provide technical guidance and best practice sharing",
        "Conduct employee safety interviews and culture assessment",
        "Review regulatory compliance and documentation",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn visit_deliverables() -> Vec<Deliverable> {
    [
        ("Site Audit Report", "Within 5 days"),
        ("Action Item Tracker", "Within 3 days"),
        ("Best Practice Sharing", "Next regional call"),
        ("Follow-up Schedule", "30/60/90 day plan"),
    ]
    .into_iter()
    .map(|(name, due)| Deliverable {
        name: name.to_string(),
        due: due.to_string(),
    })
    .collect()
}

fn data_sources() -> Vec<DataSource> {
    [
        ("BLS", "Main Survey", "https://bls.gov/iif/oshsum.htm"),
        (
            "BLS",
            "SOII Data Tables",
            "https://bls.gov/iif/oshwc/osh/case/ostb0001.htm",
        ),
        (
            "BLS",
            "Industry-Specific Data",
            "https://bls.gov/iif/oshwc/osh/case/osh_naics.htm",
        ),
        (
            "BLS",
            "NAICS 423830/423840 Data",
            "https://bls.gov/iif/oshwc/osh/case/ost4n2008.txt",
        ),
        ("OSHA", "Establishment Search", "https://osha.gov/data/commonstats"),
        ("OSHA", "Industry Profiles", "https://osha.gov/data/sic-manual"),
        ("NSC", "Injury Facts", "https://injuryfacts.nsc.org/work"),
    ]
    .into_iter()
    .map(|(agency, label, url)| DataSource {
        agency: agency.to_string(),
        label: label.to_string(),
        url: url.to_string(),
    })
    .collect()
}
