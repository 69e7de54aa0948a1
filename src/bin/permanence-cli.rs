#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use permanence::{
    io,
    model::{AssignmentKey, DutyType, EmployeeId},
    notification::{prepare_swap_notices, TextNotice},
    scheduler::{ConflictKind, Scheduler},
    storage::{JsonStorage, Storage},
    DateRange, EngineConfig,
};
use std::path::Path;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition des permanences
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Employés (JSON ou CSV)
    #[arg(long, global = true, default_value = "employees.json")]
    employees: String,

    /// Jours fériés (JSON, liste plate ou regroupée par année/mois)
    #[arg(long, global = true)]
    holidays: Option<String>,

    /// Configuration (poids, week-end local)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Fichier JSON du planning
    #[arg(long, global = true, default_value = "schedule.json")]
    schedule: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer le planning d'une période
    Generate {
        #[arg(long, requires = "months", conflicts_with_all = ["start", "end"])]
        year: Option<i32>,
        /// Mois, ex. `--months 9 10 11`
        #[arg(long, num_args = 1.., requires = "year")]
        months: Vec<u32>,
        /// Début inclus (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// Fin incluse (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Export `{date: {code: nom}}`
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        summary_csv: Option<String>,
    },

    /// Échanger deux affectations : DATE1 DUTY1 DATE2 DUTY2
    Swap {
        date1: NaiveDate,
        duty1: DutyType,
        date2: NaiveDate,
        duty2: DutyType,
        /// Répertoire où écrire les avis texte
        #[arg(long)]
        notify_dir: Option<String>,
    },

    /// Lister les affectations
    List {
        #[arg(long)]
        employee: Option<String>,
    },

    /// Vérifier le planning contre le roster courant
    Check,

    /// Synthèse par employé
    Summary {
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let mut scheduler = build_scheduler(&cli)?;
    let storage = JsonStorage::open(&cli.schedule)?;

    let code = match cli.cmd {
        Commands::Generate {
            year,
            months,
            start,
            end,
            out_json,
            out_csv,
            summary_csv,
        } => {
            let range = match (year, start, end) {
                (Some(year), None, None) => DateRange::months(year, months),
                (None, Some(start), Some(end)) => DateRange::span(start, end),
                _ => bail!("use either --year/--months or --start/--end"),
            };
            let report = scheduler.generate(&range)?;
            for key in report.unfilled() {
                eprintln!("warning: unfilled slot {key}");
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &scheduler)?;
            }
            if let Some(path) = summary_csv {
                io::export_summary_csv(path, &scheduler.summary())?;
            }
            if let Some(path) = out_json {
                let export = scheduler.export()?;
                io::export_schedule_json(path, &export)?;
            }
            storage.save(&scheduler.document())?;
            println!(
                "{} of {} slot(s) assigned, schedule saved to {}",
                report.filled_slots,
                report.required_slots,
                storage.path().display()
            );
            // Code 2 = WARNING/INCOMPLETE
            if report.is_complete() {
                0
            } else {
                2
            }
        }
        Commands::Swap {
            date1,
            duty1,
            date2,
            duty2,
            notify_dir,
        } => {
            scheduler.restore(&storage.load()?)?;
            scheduler.swap(date1, duty1, date2, duty2)?;
            storage.save(&scheduler.document())?;
            let notices = prepare_swap_notices(
                &scheduler,
                AssignmentKey::new(date1, duty1),
                AssignmentKey::new(date2, duty2),
                &TextNotice,
            )?;
            if let Some(dir) = notify_dir {
                std::fs::create_dir_all(&dir).with_context(|| format!("creating {dir}"))?;
                for notice in &notices {
                    let path = Path::new(&dir).join(format!("{}.txt", notice.employee_id));
                    std::fs::write(&path, &notice.content)?;
                }
            }
            println!(
                "Swapped {date1} {duty1} <-> {date2} {duty2} ({} notice(s) prepared)",
                notices.len()
            );
            0
        }
        Commands::List { employee } => {
            scheduler.restore(&storage.load()?)?;
            let filter = employee.map(EmployeeId::new);
            for a in scheduler.schedule().assignments() {
                if filter.as_ref().is_some_and(|id| id != &a.employee) {
                    continue;
                }
                let name = scheduler
                    .find_employee(&a.employee)
                    .map(|e| e.name.as_str())
                    .unwrap_or("-");
                let tag = if a.holiday { " (holiday)" } else { "" };
                println!("{} | {} | {} | {}{}", a.key.date, a.key.duty, name, a.weight, tag);
            }
            0
        }
        Commands::Check => {
            scheduler.restore(&storage.load()?)?;
            let conflicts = scheduler.detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    let kind = match c.kind {
                        ConflictKind::Blocked => "blocked",
                        ConflictKind::Sabbath => "sabbath",
                        ConflictKind::DoubleBooking => "double",
                        ConflictKind::UnknownEmployee => "unknown-employee",
                    };
                    eprintln!("{} | {} | {}", c.key, c.employee, kind);
                }
                2
            }
        }
        Commands::Summary { out_csv } => {
            scheduler.restore(&storage.load()?)?;
            let rows = scheduler.summary();
            if let Some(path) = out_csv {
                io::export_summary_csv(path, &rows)?;
            }
            print!("{}", io::summary_to_csv_string(&rows)?);
            println!("spread: {}", scheduler.schedule().balance().spread());
            0
        }
    };

    std::process::exit(code);
}

fn build_scheduler(cli: &Cli) -> Result<Scheduler> {
    let records = io::load_employees(&cli.employees)?;
    let holidays = match &cli.holidays {
        Some(path) => io::load_holidays(path)?,
        None => Vec::new(),
    };
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let scheduler = Scheduler::from_records(records, &holidays, config)?;
    for rejected in scheduler.rejected() {
        eprintln!("warning: {rejected}");
    }
    Ok(scheduler)
}
