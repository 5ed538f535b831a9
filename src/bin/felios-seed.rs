//! felios-seed - drop-and-recreate generation pass
//!
//! Resets the Schema Store, generates a synthetic scenario, rotates shifts,
//! allocates assignments and writes everything back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use felios_plan::allocator::generate;
use felios_plan::config::{AllocationStrategy, GeneratorConfig};
use felios_plan::seed::generate_dataset;
use felios_plan::store::Store;
use felios_plan::validation::{audit_assignments, validate_dataset};

#[derive(Debug, Parser)]
#[command(name = "felios-seed", version, about = "Seed the planning database")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "FELIOS_DB", default_value = "felios.db")]
    db: PathBuf,

    /// JSON generator config; unset keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible pass.
    #[arg(long)]
    seed: Option<u64>,

    /// Horizon year.
    #[arg(long)]
    year: Option<i32>,

    /// Assignment strategy.
    #[arg(long, value_enum)]
    strategy: Option<AllocationStrategy>,
}

impl Cli {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(year) = self.year {
            config = config.with_year(year);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.generator_config()?;
    info!(
        db = %cli.db.display(),
        year = config.year,
        strategy = ?config.strategy,
        seed = ?config.seed,
        "Starting generation pass"
    );

    let mut rng = config.rng();
    let mut data = generate_dataset(&config, &mut rng).context("generating dataset")?;
    if let Err(errors) = validate_dataset(&data) {
        for e in &errors {
            warn!(kind = ?e.kind, "{}", e.message);
        }
        anyhow::bail!("generated dataset failed validation ({} errors)", errors.len());
    }

    let kpi = generate(&mut data, &config, &mut rng).context("allocating")?;

    let horizon = config.horizon()?;
    let violations = audit_assignments(&data, &horizon, config.utilization_cap);
    for v in &violations {
        warn!(kind = ?v.violation_type, entity = v.entity_id, "{}", v.message);
    }

    let store = Store::open(&cli.db).with_context(|| format!("opening {}", cli.db.display()))?;
    store.reset().context("resetting schema")?;
    let rows = store.write_dataset(&data).context("writing dataset")?;

    info!(
        rows,
        projects = data.projects.len(),
        operations = data.operations.len(),
        employees = data.employees.len(),
        shifts = data.employee_shifts.len(),
        assignments = data.assignments.len(),
        assigned_hours = kpi.total_assigned_hours,
        assignable_hours = kpi.total_assignable_hours,
        fully_covered = kpi.operations_fully_covered,
        partially_covered = kpi.operations_partially_covered,
        uncovered = kpi.operations_uncovered,
        violations = violations.len(),
        "Generation pass complete"
    );
    Ok(())
}
