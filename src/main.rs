use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use log::{error, info, LevelFilter};
use thiserror::Error;

use rcpsp_sat::encoding::{
    Both, EncodingConfig, LogObserver, Phase, ScheduleEncoding, SolveObserver, SolveOutcome,
    TimingObserver,
};
use rcpsp_sat::error::SchedulingError;
use rcpsp_sat::generate::{generate, GeneratorConfig};
use rcpsp_sat::models::Project;
use rcpsp_sat::report::write_report;
use rcpsp_sat::sat::{write_dimacs, ExternalEngine, SplrEngine};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project definition in JSON. Reads standard input when absent or '-'.
    instance_path: Option<PathBuf>,

    /// Write the schedule report to this file instead of standard output.
    #[arg(short = 'r', long = "report")]
    report_path: Option<PathBuf>,

    /// Export the CNF formula in DIMACS format.
    #[arg(long = "dimacs")]
    dimacs_path: Option<PathBuf>,

    /// Solve with an external SAT solver binary called as
    /// `<solver> <cnf-file> <result-file>` instead of the linked engine.
    #[arg(long = "solver")]
    solver: Option<PathBuf>,

    /// Disable critical path domain pruning.
    #[arg(long = "no-pruning", default_value_t = false)]
    no_pruning: bool,

    /// Allow idle time slots between busy ones.
    #[arg(long = "allow-gaps", default_value_t = false)]
    allow_gaps: bool,

    /// Solve a random instance drawn from this seed instead of reading one.
    #[arg(long = "generate")]
    generate: Option<u64>,

    /// Number of activities of a generated instance.
    #[arg(long = "activities", default_value_t = 8)]
    activities: usize,

    /// Write the project, with critical path bounds and resolved times, as JSON.
    #[arg(long = "json")]
    json_path: Option<PathBuf>,

    /// Print the project definition before solving.
    #[arg(long = "dump", default_value_t = false)]
    dump: bool,

    /// Enables log message output.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error("cannot read project definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type CliResult<T> = Result<T, CliError>;

fn configure_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder
        .format(|buf, record| writeln!(buf, "c {} {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();
}

fn read_project(path: Option<&Path>) -> CliResult<Project> {
    let mut project: Project = match path {
        Some(p) if p != Path::new("-") => {
            info!("reading {}", p.display());
            serde_json::from_reader(BufReader::new(File::open(p)?))?
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            serde_json::from_str(&text)?
        }
    };
    project.rebuild_links();
    Ok(project)
}

fn main() {
    if let Err(e) = run() {
        error!("Execution failed, error: {e}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose);
    let started = Instant::now();

    let mut project = match args.generate {
        Some(seed) => {
            let config = GeneratorConfig::default().with_activities(args.activities);
            generate(seed, &config)
        }
        None => read_project(args.instance_path.as_deref())?,
    };
    if args.dump {
        print!("{project}");
    }

    let config = EncodingConfig::default()
        .with_domain_pruning(!args.no_pruning)
        .with_no_time_gaps(!args.allow_gaps);
    let mut observer = Both(LogObserver, TimingObserver::new());

    observer.phase_started(Phase::Encode);
    let encode_started = Instant::now();
    let mut encoding = ScheduleEncoding::build_with(&project, config)?;
    observer.phase_finished(Phase::Encode, encode_started.elapsed());
    project.record_bounds(encoding.bounds());

    if let Some(path) = &args.dimacs_path {
        write_dimacs(encoding.formula(), BufWriter::new(File::create(path)?))?;
        info!("formula written to {}", path.display());
    }

    let outcome = match &args.solver {
        Some(binary) => encoding.solve(&ExternalEngine::new(binary.clone()), &mut observer)?,
        None => encoding.solve(&SplrEngine, &mut observer)?,
    };
    if let SolveOutcome::Scheduled(schedule) = &outcome {
        project.record_resolution(&schedule.resolved_times());
    }

    if let Some(path) = &args.json_path {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &project)?;
    }

    match &args.report_path {
        Some(path) => {
            write_report(BufWriter::new(File::create(path)?), &encoding, &outcome)?;
            println!("{}", if outcome.is_scheduled() { "SAT" } else { "UNSAT" });
        }
        None => write_report(io::stdout().lock(), &encoding, &outcome)?,
    }

    let timing = &observer.1;
    eprintln!(
        "Total time: {:.3} s, solver time: {:.3} s",
        started.elapsed().as_secs_f64(),
        timing.solver_time().as_secs_f64()
    );
    Ok(())
}
