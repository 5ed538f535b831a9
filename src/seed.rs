//! Synthetic planning data.
//!
//! Builds a complete scenario (resources, workforce, projects, networks,
//! operations, milestones, dependencies) for demos and tests. Shift and
//! assignment records are left empty; [`crate::allocator::generate`] fills
//! them.
//!
//! Ids are dense and start at 1 per table, matching the store's
//! autoincrement keys after a fresh reset.
//!
//! Dependency edges are only formed between consecutive operations of a
//! network whose windows are already strictly ordered.

use chrono::{Duration, NaiveDate};
use rand::distr::uniform::SampleUniform;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::config::{ConfigError, GeneratorConfig};
use crate::models::{
    respects_order, Employee, Milestone, Network, Operation, OperationDependency, PlanningData,
    Project, Qualification, Resource, ShiftCatalog,
};

const PROJECT_NAMES: &[&str] = &[
    "Hydraulikpresse", "Montagelinie", "Roboterzelle", "Fräsmaschine", "Drehmaschine",
    "Förderband", "Lackieranlage", "Schweißroboter", "Montageautomat", "Prüfstand",
    "Verpackungsstraße", "CNC-Bearbeitung", "Blechumformung", "Gießerei", "Bohrwerk",
    "Laserstation", "Stanzautomat", "Montageinsel", "Palettierer", "Sortieranlage",
];

const NETWORK_NAMES: &[&str] = &[
    "Vormontage", "Endmontage", "Qualitätsprüfung", "Logistik", "Materialbereitstellung",
    "Fertigung", "Verpackung", "Lackierung", "Schweißen", "Montage", "Prüfung", "Transport",
];

const OPERATION_NAMES: &[&str] = &[
    "Bohren", "Fräsen", "Drehen", "Montieren", "Schweißen", "Lackieren", "Prüfen", "Verpacken",
    "Transportieren", "Justieren", "Reinigen", "Entgraten", "Schrauben", "Palettieren",
    "Sortieren", "Einlagern", "Auslagern", "Beschriften", "Kalibrieren", "Testen",
];

const MILESTONE_NAMES: &[&str] = &[
    "Konstruktionsfreigabe", "Materialeingang", "Fertigungsstart", "Montagebeginn",
    "Erste Prüfung", "Endabnahme", "Auslieferung", "Projektabschluss", "Zwischenabnahme",
    "Serienstart",
];

const RESOURCE_NAMES: &[&str] = &[
    "CNC-Fräse", "Industrieroboter", "Montageband", "Schweißgerät", "Lackierkabine", "Prüfstand",
];

const FIRST_NAMES: &[&str] = &[
    "Lukas", "Leon", "Finn", "Paul", "Jonas", "Elias", "Noah", "Ben", "Luis", "Felix",
    "Anna", "Lea", "Mia", "Emma", "Lina", "Marie", "Sophie", "Hannah", "Laura", "Clara",
    "Maximilian", "Moritz", "Julian", "Tim", "David", "Fabian", "Simon", "Tom", "Jan", "Philipp",
];

const LAST_NAMES: &[&str] = &[
    "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker",
    "Hoffmann", "Schulz", "Koch", "Bauer", "Richter", "Klein", "Wolf", "Schröder", "Neumann",
    "Schwarz", "Zimmermann", "Braun", "Krüger", "Hofmann", "Hartmann", "Lange", "Schmitt",
];

const PROJECT_COLORS: &[&str] = &[
    "#E57373", "#64B5F6", "#81C784", "#FFB74D", "#BA68C8", "#4DB6AC", "#F06292", "#A1887F",
];

/// Draws from an inclusive range given as a (possibly swapped) pair.
fn draw<T, R>(rng: &mut R, (a, b): (T, T)) -> T
where
    T: SampleUniform + PartialOrd + Copy,
    R: Rng,
{
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.random_range(lo..=hi)
}

/// `date` moved by a validated day offset; `None` past chrono's last date.
fn shifted(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

fn pick<'a, R: Rng>(rng: &mut R, names: &[&'a str]) -> &'a str {
    names[rng.random_range(0..names.len())]
}

/// Generates a synthetic planning scenario.
///
/// The shift table holds the standard catalog; shift and assignment
/// records stay empty.
pub fn generate_dataset<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<PlanningData, ConfigError> {
    let horizon = config.horizon()?;
    let year_start: NaiveDate = horizon.start();
    let shape = &config.data;
    shape.validate()?;
    let mut data = PlanningData::new();

    data.resources = RESOURCE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Resource::new(i as i64 + 1, *name))
        .collect();
    data.shifts = ShiftCatalog::standard().all().cloned().collect();
    data.employees = generate_employees(shape.employees, rng);

    // Even spread over resources, some employees get a second one.
    let resource_count = data.resources.len();
    for (i, employee) in data.employees.iter().enumerate() {
        let primary = data.resources[i % resource_count].id;
        data.qualifications.push(Qualification::new(employee.id, primary));
        if resource_count > 1 && rng.random::<f64>() < shape.second_qualification_probability {
            let mut other = primary;
            while other == primary {
                other = data.resources[rng.random_range(0..resource_count)].id;
            }
            data.qualifications.push(Qualification::new(employee.id, other));
        }
    }

    let mut next_network = 1i64;
    let mut next_operation = 1i64;
    let mut next_milestone = 1i64;

    for p in 0..shape.projects {
        let project_id = p as i64 + 1;
        data.projects.push(
            Project::new(
                project_id,
                format!("{} {}", PROJECT_NAMES[p % PROJECT_NAMES.len()], p + 1),
            )
            .with_color(PROJECT_COLORS[p % PROJECT_COLORS.len()]),
        );

        let network_count = draw(rng, shape.networks_per_project);
        for n in 0..network_count {
            let network_id = next_network;
            next_network += 1;
            data.networks.push(Network::new(
                network_id,
                project_id,
                format!("{} {}", pick(rng, NETWORK_NAMES), n + 1),
            ));

            let mut previous: Option<Operation> = None;
            let op_count = draw(rng, shape.operations_per_network);
            for o in 0..op_count {
                let start = shifted(year_start, draw(rng, shape.start_day))
                    .ok_or(ConfigError::InvalidYear(config.year))?;
                let end = shifted(start, draw(rng, shape.duration_days))
                    .ok_or(ConfigError::InvalidYear(config.year))?;
                let op = Operation::new(
                    next_operation,
                    network_id,
                    format!("{} {}", pick(rng, OPERATION_NAMES), o + 1),
                    data.resources[(o + n) % resource_count].id,
                )
                .with_window(start, end)
                .with_demand(draw(rng, shape.demand_hours));
                next_operation += 1;

                if let Some(prev) = &previous {
                    let wants_edge = rng.random::<f64>() < shape.dependency_probability;
                    if wants_edge && respects_order(prev, &op) {
                        data.dependencies.push(OperationDependency::new(op.id, prev.id));
                    }
                }
                data.operations.push(op.clone());
                previous = Some(op);
            }
        }

        let milestone_count = draw(rng, shape.milestones_per_project);
        for m in 0..milestone_count {
            let due = shifted(year_start, draw(rng, shape.milestone_day))
                .ok_or(ConfigError::InvalidYear(config.year))?;
            data.milestones.push(
                Milestone::new(
                    next_milestone,
                    project_id,
                    format!("{} {}", pick(rng, MILESTONE_NAMES), m + 1),
                )
                .with_due_date(due),
            );
            next_milestone += 1;
        }
    }

    debug!(
        projects = data.projects.len(),
        networks = data.networks.len(),
        operations = data.operations.len(),
        dependencies = data.dependencies.len(),
        employees = data.employees.len(),
        "synthetic dataset generated"
    );
    Ok(data)
}

/// Employees with unique names; falls back to numbered names once the
/// first/last combinations run dry.
fn generate_employees<R: Rng>(count: usize, rng: &mut R) -> Vec<Employee> {
    let mut used = HashSet::new();
    let mut employees = Vec::with_capacity(count);

    while employees.len() < count {
        let mut name = String::new();
        for _ in 0..64 {
            let candidate = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
            if !used.contains(&candidate) {
                name = candidate;
                break;
            }
        }
        if name.is_empty() {
            name = format!("{} {} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES), employees.len() + 1);
        }
        used.insert(name.clone());
        employees.push(Employee::new(employees.len() as i64 + 1, name));
    }

    employees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeedConfig, MAX_DAY_OFFSET};
    use chrono::Datelike;
    use crate::validation::validate_dataset;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn config() -> GeneratorConfig {
        GeneratorConfig::default().with_data(SeedConfig {
            projects: 6,
            employees: 20,
            ..SeedConfig::default()
        })
    }

    #[test]
    fn test_dataset_shape() {
        let mut rng = SmallRng::seed_from_u64(5);
        let data = generate_dataset(&config(), &mut rng).unwrap();

        assert_eq!(data.projects.len(), 6);
        assert_eq!(data.employees.len(), 20);
        assert_eq!(data.resources.len(), RESOURCE_NAMES.len());
        assert_eq!(data.shifts.len(), 4);
        assert!(data.networks.len() >= 12 && data.networks.len() <= 18);
        assert!(data.employee_shifts.is_empty());
        assert!(data.assignments.is_empty());

        for op in &data.operations {
            assert!((4..=16).contains(&op.capacity_demand));
            let w = op.window().unwrap();
            let len = (w.end - w.start).num_days();
            assert!((1..=5).contains(&len));
        }
        for project in &data.projects {
            let milestones = data.milestones.iter().filter(|m| m.project_id == project.id).count();
            assert!((2..=4).contains(&milestones));
        }
    }

    #[test]
    fn test_every_employee_qualified() {
        let mut rng = SmallRng::seed_from_u64(5);
        let data = generate_dataset(&config(), &mut rng).unwrap();
        for e in &data.employees {
            let quals: Vec<_> = data.qualifications.iter().filter(|q| q.employee_id == e.id).collect();
            assert!(quals.len() == 1 || quals.len() == 2);
            if quals.len() == 2 {
                assert_ne!(quals[0].resource_id, quals[1].resource_id);
            }
        }
    }

    #[test]
    fn test_dependencies_respect_order() {
        let mut rng = SmallRng::seed_from_u64(8);
        let data = generate_dataset(&config(), &mut rng).unwrap();
        for dep in &data.dependencies {
            let succ = data.operation(dep.operation_id).unwrap();
            let pred = data.operation(dep.depends_on_operation_id).unwrap();
            assert!(respects_order(pred, succ));
            assert_eq!(pred.network_id, succ.network_id);
        }
        assert!(validate_dataset(&data).is_ok());
    }

    #[test]
    fn test_unique_employee_names_beyond_combinations() {
        let mut rng = SmallRng::seed_from_u64(2);
        let employees = generate_employees(FIRST_NAMES.len() * LAST_NAMES.len() + 5, &mut rng);
        let names: HashSet<_> = employees.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), employees.len());
    }

    #[test]
    fn test_out_of_range_offsets_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        let config = GeneratorConfig::default().with_data(SeedConfig {
            start_day: (9_000_000_000_000, 9_000_000_000_000),
            ..SeedConfig::default()
        });
        assert!(matches!(
            generate_dataset(&config, &mut rng),
            Err(ConfigError::InvalidDayRange { field: "start_day", .. })
        ));

        // offsets past chrono's last representable date
        let last_year = NaiveDate::MAX.year();
        let config = GeneratorConfig::default().with_year(last_year).with_data(SeedConfig {
            projects: 1,
            employees: 1,
            start_day: (MAX_DAY_OFFSET, MAX_DAY_OFFSET),
            ..SeedConfig::default()
        });
        assert!(matches!(
            generate_dataset(&config, &mut rng),
            Err(ConfigError::InvalidYear(_))
        ));
    }

    #[test]
    fn test_draw_swapped_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let v = draw(&mut rng, (9u32, 3u32));
            assert!((3..=9).contains(&v));
        }
    }
}
