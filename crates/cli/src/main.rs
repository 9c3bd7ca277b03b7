//! VLIW470 scheduler CLI.
//!
//! Two subcommands: `schedule` decodes a program, runs both schedulers, and
//! writes the simple and pipelined schedules to JSON or CSV (chosen by
//! output file extension); `cmp` diffs a produced pair of schedule files
//! against a reference pair.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vliw470_core::compare::compare_files;
use vliw470_core::config::Config;
use vliw470_core::emit::{render_dep_table, render_pipeline, render_simple};
use vliw470_core::{schedule_program, SchedError};

#[derive(Parser, Debug)]
#[command(
    name = "vliw470",
    author,
    version,
    about = "Static instruction scheduler for a five-slot VLIW with software pipelining"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity; stack for more detail (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schedule a program, writing a simple and a pipelined schedule.
    Schedule {
        /// Input program: one instruction per line, or a JSON array of strings.
        input: PathBuf,
        /// Output path for the non-pipelined schedule (`.json` or `.csv`).
        simple_out: PathBuf,
        /// Output path for the pipelined schedule (`.json` or `.csv`).
        pipeline_out: PathBuf,
        /// Also write a `depTable.csv` diagnostic next to `simple_out`.
        #[arg(long)]
        dump_dep_table: bool,
    },
    /// Compare a produced schedule pair against a reference pair.
    Cmp {
        /// Produced non-pipelined schedule.
        produced_simple: PathBuf,
        /// Produced pipelined schedule.
        produced_pipeline: PathBuf,
        /// Reference non-pipelined schedule.
        reference_simple: PathBuf,
        /// Reference pipelined schedule.
        reference_pipeline: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Schedule {
            input,
            simple_out,
            pipeline_out,
            dump_dep_table,
        } => cmd_schedule(&input, &simple_out, &pipeline_out, dump_dep_table),
        Commands::Cmp {
            produced_simple,
            produced_pipeline,
            reference_simple,
            reference_pipeline,
        } => cmd_cmp(
            &produced_simple,
            &produced_pipeline,
            &reference_simple,
            &reference_pipeline,
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_schedule(
    input: &PathBuf,
    simple_out: &PathBuf,
    pipeline_out: &PathBuf,
    dump_dep_table: bool,
) -> Result<(), SchedError> {
    let source = read_input(input)?;
    let config = Config::with_program_len(source.lines().count());

    tracing::info!(path = %input.display(), "decoding program");
    let program = schedule_program(&source, &config)?;
    tracing::info!(
        ii = program.pipeline.ii,
        num_stage = program.pipeline.num_stage,
        "scheduling complete"
    );

    write_schedule(simple_out, &render_simple(&program.simple))?;
    write_schedule(
        pipeline_out,
        &render_pipeline(&program.pipeline, &program.pipeline_deps),
    )?;

    if dump_dep_table {
        let dump_path = simple_out.with_file_name("depTable.csv");
        let dump = render_dep_table(&program.instructions, &program.simple_deps);
        std::fs::write(&dump_path, dump).map_err(|e| SchedError::Io {
            path: dump_path.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    Ok(())
}

fn cmd_cmp(
    produced_simple: &PathBuf,
    produced_pipeline: &PathBuf,
    reference_simple: &PathBuf,
    reference_pipeline: &PathBuf,
) -> Result<(), SchedError> {
    let report = compare_files(
        produced_simple,
        produced_pipeline,
        reference_simple,
        reference_pipeline,
    )?;
    print!("{report}");
    if !report.is_match() {
        process::exit(1);
    }
    Ok(())
}

fn read_input(path: &PathBuf) -> Result<String, SchedError> {
    let raw = std::fs::read_to_string(path).map_err(|e| SchedError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        let lines: Vec<String> = serde_json::from_str(trimmed).map_err(|e| SchedError::Io {
            path: path.display().to_string(),
            reason: format!("invalid JSON instruction list: {e}"),
        })?;
        Ok(lines.join("\n"))
    } else {
        Ok(raw)
    }
}

fn write_schedule(
    path: &PathBuf,
    rows: &[vliw470_core::emit::BundleRow],
) -> Result<(), SchedError> {
    let text = if path.extension().is_some_and(|ext| ext == "json") {
        vliw470_core::emit::json::to_json(rows)?
    } else {
        vliw470_core::emit::csv::to_csv(rows)?
    };
    std::fs::write(path, text).map_err(|e| SchedError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
