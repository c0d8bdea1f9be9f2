use clap::{Args, Parser, Subcommand};
use dosage_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "medfmt")]
#[command(about = "Medication dosage formatter and plan keeper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sample medications (default)
    Show,

    /// Format a single medication without storing it
    Format(MedicationArgs),

    /// Add a medication to the plan
    Add(MedicationArgs),

    /// Print every medication in the plan
    List,

    /// Import medications from a CSV file into the plan
    Import {
        /// CSV file with columns drug_name,kind,morning,midday,evening,speed,duration
        path: PathBuf,

        /// Fail on the first invalid row instead of skipping it
        #[arg(long)]
        abort_on_invalid: bool,
    },

    /// Export the plan to a CSV file
    Export {
        /// Destination CSV file (replaced if it exists)
        path: PathBuf,
    },
}

#[derive(Args)]
struct MedicationArgs {
    /// Drug name
    #[arg(long)]
    name: String,

    /// Tablet counts for morning, midday and evening
    #[arg(
        long,
        value_name = "M,D,E",
        conflicts_with = "infusion",
        required_unless_present = "infusion"
    )]
    tablet: Option<String>,

    /// Infusion speed in ml/min and duration in hours
    #[arg(long, value_name = "SPEED,HOURS")]
    infusion: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dosage_core::logging::init_for_verbosity(cli.verbose);

    match cli.command {
        Some(Commands::Show) | None => cmd_show(),
        Some(Commands::Format(args)) => cmd_format(&args),
        Some(Commands::Add(args)) => cmd_add(resolve_data_dir(cli.data_dir)?, &args),
        Some(Commands::List) => cmd_list(resolve_data_dir(cli.data_dir)?),
        Some(Commands::Import {
            path,
            abort_on_invalid,
        }) => {
            let config = Config::load()?;
            let policy = if abort_on_invalid {
                InvalidRowPolicy::Abort
            } else {
                config.import.on_invalid
            };
            let data_dir = cli.data_dir.unwrap_or(config.data.data_dir);
            tracing::debug!("Using data directory {:?}", data_dir);
            cmd_import(data_dir, &path, policy)
        }
        Some(Commands::Export { path }) => cmd_export(resolve_data_dir(cli.data_dir)?, &path),
    }
}

/// The `--data-dir` override, else the configured data directory
///
/// Only commands that touch the plan read the config file.
fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => Config::load()?.data.data_dir,
    };
    tracing::debug!("Using data directory {:?}", data_dir);
    Ok(data_dir)
}

fn cmd_show() -> Result<()> {
    for medication in sample_medications() {
        println!("{}", format_medication(medication));
    }
    Ok(())
}

fn cmd_format(args: &MedicationArgs) -> Result<()> {
    let medication = args.to_medication()?;
    println!("{}", format_medication(&medication));
    Ok(())
}

fn cmd_add(data_dir: PathBuf, args: &MedicationArgs) -> Result<()> {
    let medication = args.to_medication()?;
    let entry = PlanEntry::new(medication);

    let mut plan = JsonlPlan::new(plan_path(&data_dir));
    tracing::debug!("Adding {} to {:?}", entry.id, plan.path());
    plan.append(&entry)?;

    println!("✓ Added {}", format_medication(&entry.medication));
    Ok(())
}

fn cmd_list(data_dir: PathBuf) -> Result<()> {
    let entries = read_plan(&plan_path(&data_dir))?;

    if entries.is_empty() {
        println!("No medications in plan.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_medication(&entry.medication));
    }
    Ok(())
}

fn cmd_import(data_dir: PathBuf, path: &Path, policy: InvalidRowPolicy) -> Result<()> {
    tracing::debug!("Importing {:?} with policy {:?}", path, policy);
    let report = import_csv(path, policy)?;

    let entries: Vec<PlanEntry> = report
        .imported
        .iter()
        .cloned()
        .map(PlanEntry::new)
        .collect();

    // Accepted rows go to the plan in one write under one lock
    let mut plan = JsonlPlan::new(plan_path(&data_dir));
    let appended = plan.append_all(&entries)?;

    println!("✓ Imported {} medications", appended);
    for rejected in &report.rejected {
        eprintln!("  ✗ line {}: {}", rejected.line, rejected.reason);
    }
    Ok(())
}

fn cmd_export(data_dir: PathBuf, path: &Path) -> Result<()> {
    let entries = read_plan(&plan_path(&data_dir))?;
    let count = export_csv(&entries, path)?;

    println!("✓ Exported {} medications", count);
    println!("  CSV: {}", path.display());
    Ok(())
}

impl MedicationArgs {
    fn to_medication(&self) -> Result<Medication> {
        let dosage = match (&self.tablet, &self.infusion) {
            (Some(tablet), None) => parse_tablet(tablet)?,
            (None, Some(infusion)) => parse_infusion(infusion)?,
            // clap enforces exactly one of the two
            _ => {
                return Err(Error::Validation(
                    "specify exactly one of --tablet or --infusion".into(),
                ))
            }
        };
        Medication::new(self.name.clone(), dosage)
    }
}

/// Parse `M,D,E` tablet counts
fn parse_tablet(value: &str) -> Result<Dosage> {
    let counts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| {
            Error::Validation(format!(
                "tablet counts must be non-negative integers, got '{}'",
                value
            ))
        })?;

    match counts.as_slice() {
        [morning, midday, evening] => Ok(Dosage::tablet(*morning, *midday, *evening)),
        _ => Err(Error::Validation(format!(
            "expected three tablet counts like 1,0,2, got '{}'",
            value
        ))),
    }
}

/// Parse `SPEED,HOURS` infusion parameters
fn parse_infusion(value: &str) -> Result<Dosage> {
    let invalid = || {
        Error::Validation(format!(
            "expected infusion speed and hours like 1.5,2, got '{}'",
            value
        ))
    };

    let (speed, hours) = value.split_once(',').ok_or_else(invalid)?;
    let speed = speed.trim().parse::<f64>().map_err(|_| invalid())?;
    let hours = hours.trim().parse::<u32>().map_err(|_| invalid())?;
    Dosage::infusion(speed, hours)
}
