//! Record Registry CLI
//!
//! One-shot commands and an interactive shell over a CSV-backed registry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use record_registry::shell::{self, Command, ShellResult};
use record_registry::network::validate_distance;
use record_registry::validate::{validate_date, validate_id, validate_name};
use record_registry::{
    Algorithm, Clinic, CourseCatalog, CsvStore, HospitalNetwork, Layout, Record, RecordOrder,
    Registry, RegistryConfig, SortKey,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "record-registry")]
#[command(about = "Linked-list record registry backed by a CSV file")]
#[command(version)]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Data file, overriding the configured path
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Record layout, overriding the configured one
    #[arg(short, long)]
    layout: Option<Layout>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a record
    Add {
        id: i64,
        name: String,
        /// Attribute values in layout order
        attributes: Vec<String>,
    },

    /// Remove a record by id
    Remove { id: i64 },

    /// Look up a record by id
    Find { id: i64 },

    /// Change a record's name and/or attributes
    Update {
        id: i64,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New attribute values in layout order
        attributes: Vec<String>,
    },

    /// List records
    List {
        /// Sort the listing
        #[arg(short, long)]
        sorted: bool,
        /// Sort order (id or name)
        #[arg(short, long)]
        by: Option<RecordOrder>,
        /// Sorting algorithm
        #[arg(short, long)]
        algorithm: Option<Algorithm>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sort the records and binary search for a key
    Search {
        /// Key kind (id or name)
        #[arg(short, long, default_value = "id")]
        by: RecordOrder,
        key: String,
        /// Sorting algorithm for the snapshot
        #[arg(short, long)]
        algorithm: Option<Algorithm>,
    },

    /// Interactive shell
    Shell,

    /// Patients, doctors and appointments
    Clinic {
        #[command(subcommand)]
        action: ClinicAction,
    },

    /// Hospitals and the distances between them
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// Students, courses and enrollments
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ClinicAction {
    /// Register a patient
    AddPatient {
        id: i64,
        name: String,
        /// Date of birth (dd-mm-yyyy)
        dob: String,
        gender: String,
    },
    /// Register a doctor
    AddDoctor {
        id: i64,
        name: String,
        specialization: String,
    },
    /// Book an appointment for an existing patient and doctor
    Book {
        id: i64,
        patient: i64,
        doctor: i64,
        /// Appointment date (dd-mm-yyyy)
        date: String,
    },
    /// Cancel an appointment
    Cancel { id: i64 },
    /// Remove a patient and their appointments
    RemovePatient { id: i64 },
    /// Remove a doctor and their appointments
    RemoveDoctor { id: i64 },
    /// List appointments
    Appointments {
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        doctor: Option<i64>,
    },
}

#[derive(Subcommand)]
enum NetworkAction {
    /// Register a hospital
    AddHospital {
        id: i64,
        name: String,
        location: String,
        patients: i64,
    },
    /// Link two hospitals
    Link {
        from: i64,
        to: i64,
        /// Distance in km
        distance: f64,
    },
    /// Remove the link between two hospitals
    Unlink { from: i64, to: i64 },
    /// Remove a hospital and its links
    RemoveHospital { id: i64 },
    /// Hospitals linked to one hospital, nearest first
    Neighbours { id: i64 },
    /// Show the whole network
    Graph,
}

#[derive(Subcommand)]
enum CoursesAction {
    /// Register a student
    AddStudent { id: i64, name: String },
    /// Register a course
    AddCourse {
        id: i64,
        name: String,
        /// Create the course closed for enrollment
        #[arg(long)]
        closed: bool,
    },
    /// Open a course for enrollment
    Open { id: i64 },
    /// Close a course for enrollment
    Close { id: i64 },
    /// Enroll a student in an open course
    Enroll { student: i64, course: i64 },
    /// Drop a student from a course
    Withdraw { student: i64, course: i64 },
    /// Remove a student and their enrollments
    RemoveStudent { id: i64 },
    /// Remove a course and its enrollments
    RemoveCourse { id: i64 },
    /// Students with their courses
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "registry.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RegistryConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(file) = cli.file {
        config.store.path = file;
    }
    if let Some(layout) = cli.layout {
        config.store.layout = layout;
    }

    let command = match cli.command {
        Commands::Config { action } => return run_config(&config, action),
        Commands::Clinic { action } => return run_clinic(&config, action),
        Commands::Network { action } => return run_network(&config, action),
        Commands::Courses { action } => return run_courses(&config, action),
        command => command,
    };

    let mut store = config.open_store();
    let mut registry = Registry::open(&store, config.store.layout)
        .with_context(|| format!("failed to load {}", store.path().display()))?
        .with_algorithm(config.sort.algorithm);
    debug!(count = registry.len(), "registry ready");

    let command = match command {
        Commands::Add { id, name, attributes } => Command::Add { id, name, attributes },
        Commands::Remove { id } => Command::Remove { id },
        Commands::Find { id } => Command::Find { id },
        Commands::Update { id, name, attributes } => Command::Update { id, name, attributes },
        Commands::List { sorted, by, algorithm, json } => {
            if json {
                let records = if sorted {
                    let order = by.unwrap_or(config.sort.order);
                    registry.list_sorted(order, algorithm.unwrap_or(registry.algorithm()))
                } else {
                    registry.records()
                };
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            if sorted {
                Command::ListSorted {
                    order: by.unwrap_or(config.sort.order),
                    algorithm,
                }
            } else {
                Command::List
            }
        }
        Commands::Search { by, key, algorithm } => {
            let algorithm = algorithm.unwrap_or(registry.algorithm());
            registry.build_snapshot_with(by, algorithm);
            let key = match by {
                RecordOrder::Id => SortKey::Id(key.parse().context("id must be a number")?),
                RecordOrder::Name => SortKey::Name(key),
            };
            Command::Search { key }
        }
        Commands::Shell => return run_shell(&mut registry, &mut store),
        Commands::Config { .. }
        | Commands::Clinic { .. }
        | Commands::Network { .. }
        | Commands::Courses { .. } => unreachable!("dispatched before the registry is opened"),
    };

    let mutates = matches!(
        command,
        Command::Add { .. } | Command::Remove { .. } | Command::Update { .. }
    );
    if let ShellResult::Output(lines) = shell::execute(&mut registry, command)? {
        for line in lines {
            println!("{}", line);
        }
    }
    if mutates {
        registry.save(&mut store)?;
    }
    Ok(())
}

fn run_shell(registry: &mut Registry, store: &mut CsvStore) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=".repeat(60));
    println!(
        "RECORD REGISTRY ({} records, {} layout)",
        registry.len(),
        registry.layout()
    );
    println!("{}", "=".repeat(60));
    println!("Type 'help' for commands, 'exit' to save and quit.");

    loop {
        let line = match rl.readline(">> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let command = match shell::parse_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}. Type 'help' for usage.", e);
                continue;
            }
        };

        match shell::execute(registry, command) {
            Ok(ShellResult::Output(lines)) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Ok(ShellResult::Save) => {
                registry.save(store)?;
                println!("Saved {} records to {}", registry.len(), store.path().display());
            }
            Ok(ShellResult::Quit) => break,
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    registry.save(store)?;
    println!("Saved {} records. Goodbye!", registry.len());
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn render<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    let lines: Vec<String> = records.into_iter().map(ToString::to_string).collect();
    if lines.is_empty() {
        return vec!["No records.".to_string()];
    }
    lines
}

fn run_clinic(config: &RegistryConfig, action: ClinicAction) -> Result<()> {
    let store_for = |layout: Layout| config.store_for(layout);
    let mut clinic = Clinic::open(store_for).context("failed to load clinic files")?;

    let lines = match action {
        ClinicAction::AddPatient { id, name, dob, gender } => {
            clinic.register_patient(
                validate_id(id)?,
                validate_name(&name)?,
                validate_date(&dob)?,
                validate_name(&gender)?,
            )?;
            vec![format!("Registered patient {}", id)]
        }
        ClinicAction::AddDoctor { id, name, specialization } => {
            clinic.register_doctor(
                validate_id(id)?,
                validate_name(&name)?,
                validate_name(&specialization)?,
            )?;
            vec![format!("Registered doctor {}", id)]
        }
        ClinicAction::Book { id, patient, doctor, date } => {
            clinic.book_appointment(validate_id(id)?, patient, doctor, validate_date(&date)?)?;
            vec![format!("Booked appointment {}", id)]
        }
        ClinicAction::Cancel { id } => {
            vec![format!("Cancelled {}", clinic.cancel_appointment(id)?)]
        }
        ClinicAction::RemovePatient { id } => {
            vec![format!("Removed patient {}", clinic.remove_patient(id)?)]
        }
        ClinicAction::RemoveDoctor { id } => {
            vec![format!("Removed doctor {}", clinic.remove_doctor(id)?)]
        }
        ClinicAction::Appointments { patient, doctor } => {
            let lines = match (patient, doctor) {
                (Some(p), _) => render(clinic.appointments_for_patient(p)),
                (None, Some(d)) => render(clinic.appointments_for_doctor(d)),
                (None, None) => render(clinic.appointments().iter()),
            };
            print_lines(&lines);
            return Ok(());
        }
    };

    print_lines(&lines);
    clinic.save(store_for)?;
    Ok(())
}

fn run_network(config: &RegistryConfig, action: NetworkAction) -> Result<()> {
    let store_for = |layout: Layout| config.store_for(layout);
    let mut network = HospitalNetwork::open(store_for).context("failed to load network files")?;

    let lines = match action {
        NetworkAction::AddHospital { id, name, location, patients } => {
            network.add_hospital(
                validate_id(id)?,
                validate_name(&name)?,
                validate_name(&location)?,
                patients,
            )?;
            vec![format!("Added hospital {}", id)]
        }
        NetworkAction::Link { from, to, distance } => {
            network.link(from, to, validate_distance(distance)?)?;
            vec![format!("Linked H{} and H{} ({} km)", from, to, distance)]
        }
        NetworkAction::Unlink { from, to } => {
            network.unlink(from, to)?;
            vec![format!("Unlinked H{} and H{}", from, to)]
        }
        NetworkAction::RemoveHospital { id } => {
            vec![format!("Removed {}", network.remove_hospital(id)?)]
        }
        NetworkAction::Neighbours { id } => {
            network.hospitals().find_exact(id)?;
            let neighbours = network.neighbours(id);
            if neighbours.is_empty() {
                println!("H{} has no links.", id);
            }
            for n in neighbours {
                println!("H{} ({} km)", n.hospital_id, n.distance);
            }
            return Ok(());
        }
        NetworkAction::Graph => {
            print_lines(&network.render());
            return Ok(());
        }
    };

    print_lines(&lines);
    network.save(store_for)?;
    Ok(())
}

fn run_courses(config: &RegistryConfig, action: CoursesAction) -> Result<()> {
    let store_for = |layout: Layout| config.store_for(layout);
    let mut catalog = CourseCatalog::open(store_for).context("failed to load course files")?;

    let lines = match action {
        CoursesAction::AddStudent { id, name } => {
            catalog.add_student(validate_id(id)?, validate_name(&name)?)?;
            vec![format!("Added student {}", id)]
        }
        CoursesAction::AddCourse { id, name, closed } => {
            catalog.add_course(validate_id(id)?, validate_name(&name)?, !closed)?;
            vec![format!("Added course {}", id)]
        }
        CoursesAction::Open { id } => {
            catalog.set_available(id, true)?;
            vec![format!("Course {} is open", id)]
        }
        CoursesAction::Close { id } => {
            catalog.set_available(id, false)?;
            vec![format!("Course {} is closed", id)]
        }
        CoursesAction::Enroll { student, course } => {
            catalog.enroll(student, course)?;
            vec![format!("Enrolled student {} in course {}", student, course)]
        }
        CoursesAction::Withdraw { student, course } => {
            catalog.withdraw(student, course)?;
            vec![format!("Withdrew student {} from course {}", student, course)]
        }
        CoursesAction::RemoveStudent { id } => {
            vec![format!("Removed {}", catalog.remove_student(id)?)]
        }
        CoursesAction::RemoveCourse { id } => {
            vec![format!("Removed {}", catalog.remove_course(id)?)]
        }
        CoursesAction::List => {
            print_lines(&catalog.render());
            return Ok(());
        }
    };

    print_lines(&lines);
    catalog.save(store_for)?;
    Ok(())
}

fn run_config(config: &RegistryConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("{}", toml::to_string_pretty(config)?);
            }
        }
        ConfigAction::Init { output } => {
            RegistryConfig::default().save(&output)?;
            println!("Wrote default configuration to {}", output);
        }
    }
    Ok(())
}
