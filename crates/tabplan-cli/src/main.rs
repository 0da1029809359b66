mod cli;
mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tabplan_eval::{CsvSource, Engine, TableSource};
use tabplan_types::{Plan, RunError};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    let mut cfg = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            plan,
            base_dir,
            report,
            pretty,
            transcript,
            preview_threshold,
            preview_rows,
            float_tolerance,
        } => {
            if base_dir.is_some() {
                cfg.base_dir = base_dir;
            }
            if let Some(v) = preview_threshold {
                cfg.engine.preview_threshold = v;
            }
            if let Some(v) = preview_rows {
                cfg.engine.preview_rows = v;
            }
            if let Some(v) = float_tolerance {
                cfg.engine.float_tolerance = v;
            }
            run(&plan, &cfg, report.as_deref(), pretty, transcript)
        }
        Commands::Columns { csv } => {
            let names = csv_source(&cfg)
                .columns(&csv.to_string_lossy())
                .with_context(|| format!("reading columns of {}", csv.display()))?;
            println!("{}", serde_json::to_string(&names)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { plan: path } => {
            let plan = read_plan(&path)?.with_context(|| format!("parsing {}", path.display()))?;
            println!("{} step(s), fingerprint {}", plan.len(), plan.fingerprint());
            for (i, op) in plan.iter().enumerate() {
                let arrow = match (&op.input, &op.output) {
                    (Some(input), Some(output)) => format!("{input} -> {output}"),
                    (Some(input), None) => format!("{input} ->"),
                    (None, Some(output)) => format!("-> {output}"),
                    (None, None) => String::new(),
                };
                println!("{:>3}. {:<20} {:<16} {}", i + 1, op.kind.wire_name(), arrow, op.label(i));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read a plan file. I/O failures are errors of the runner; parse failures
/// are returned for the caller to report.
fn read_plan(path: &Path) -> Result<Result<Plan, RunError>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading plan {}", path.display()))?;
    Ok(Plan::from_json(&text).map_err(RunError::from))
}

fn csv_source(cfg: &Config) -> CsvSource {
    match &cfg.base_dir {
        Some(dir) => CsvSource::with_base_dir(dir),
        None => CsvSource::new(),
    }
}

fn run(
    plan_path: &Path,
    cfg: &Config,
    report_path: Option<&Path>,
    pretty: bool,
    echo_transcript: bool,
) -> Result<ExitCode> {
    let source = csv_source(cfg);
    let mut engine = Engine::with_options(&source, cfg.engine.clone());

    let plan = read_plan(plan_path)?;
    let result = match &plan {
        Ok(plan) => engine.run(plan),
        Err(err) => Err(err.clone()),
    };
    let (envelope, code) = match &result {
        Ok(output) => (report::success(output), ExitCode::SUCCESS),
        Err(err) => (report::failure(err), ExitCode::FAILURE),
    };

    if echo_transcript {
        for line in engine.transcript() {
            eprintln!("{line}");
        }
    }
    if let Some(path) = report_path {
        let text = report::render(plan.as_ref().ok(), engine.transcript(), &envelope);
        fs::write(path, text).with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    if pretty {
        println!("{}", report::pretty(&envelope));
    } else {
        println!("{envelope}");
    }
    Ok(code)
}

