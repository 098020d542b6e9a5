//! fd-bench command-line interface.
//!
//! Thin shell over the engine: loads traces and detector configs, runs the
//! requested evaluation, and prints JSON results on stdout. Scoring and
//! visualization live elsewhere.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fd_core::{
    evaluate_spec, mistake_sweep, run_units, trace_io, DetectorSpec, EvalUnit, NullProbe,
    ResourceProbe, Result, SelfProbe,
};

#[derive(Parser)]
#[command(
    name = "fd-bench",
    about = "Replay heartbeat traces through failure-detector estimators",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one detector configuration against one or more traces.
    Run {
        /// CSV trace file; repeat to fan out over several traces.
        #[arg(long, required = true)]
        trace: Vec<PathBuf>,
        /// Keep only rows from this sender site.
        #[arg(long)]
        site: Option<u64>,
        /// Detector configuration (JSON file with a `detector` tag).
        #[arg(long)]
        config: PathBuf,
        /// Worker threads for multi-trace runs.
        #[arg(long, default_value_t = 1)]
        workers: usize,
        /// Report zero resource usage instead of probing the process.
        #[arg(long)]
        null_probe: bool,
    },
    /// Sweep the configuration's array-typed parameter over one trace.
    Sweep {
        #[arg(long)]
        trace: PathBuf,
        #[arg(long)]
        site: Option<u64>,
        #[arg(long)]
        config: PathBuf,
    },
    /// Compile a rule program and evaluate it against one trace.
    Rule {
        #[arg(long)]
        trace: PathBuf,
        #[arg(long)]
        site: Option<u64>,
        /// Rule program source file (`Outside`/`Inside`/`EA` sections).
        #[arg(long)]
        program: PathBuf,
        /// Base heartbeat interval exposed to the program as `delta`.
        #[arg(long, default_value_t = 1.0)]
        base_interval: f64,
        #[arg(long)]
        null_probe: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = real_main() {
        eprintln!("fd-bench: {err}");
        std::process::exit(err.code() as i32);
    }
}

fn real_main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            trace,
            site,
            config,
            workers,
            null_probe,
        } => run(&trace, site, &config, workers, null_probe),
        Command::Sweep {
            trace,
            site,
            config,
        } => sweep(&trace, site, &config),
        Command::Rule {
            trace,
            site,
            program,
            base_interval,
            null_probe,
        } => rule(&trace, site, &program, base_interval, null_probe),
    }
}

fn load_spec(path: &Path) -> Result<DetectorSpec> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn pick_probe(null_probe: bool) -> Box<dyn ResourceProbe> {
    if null_probe {
        Box::new(NullProbe)
    } else {
        Box::new(SelfProbe)
    }
}

fn run(
    traces: &[PathBuf],
    site: Option<u64>,
    config: &Path,
    workers: usize,
    null_probe: bool,
) -> Result<()> {
    let spec = load_spec(config)?;
    let probe = pick_probe(null_probe);

    if let [only] = traces {
        let trace = trace_io::load_trace_csv(only, site)?;
        let report = evaluate_spec(&trace, &spec, probe.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let units = traces
        .iter()
        .map(|path| {
            Ok(EvalUnit {
                trace: Arc::new(trace_io::load_trace_csv(path, site)?),
                spec: spec.clone(),
            })
        })
        .collect::<Result<Vec<EvalUnit>>>()?;

    let results = run_units(&units, workers, probe.as_ref());
    let rendered: Vec<serde_json::Value> = results
        .iter()
        .zip(traces.iter())
        .map(|(result, path)| match result {
            Ok(report) => serde_json::json!({
                "trace": path.display().to_string(),
                "report": report,
            }),
            Err(err) => serde_json::json!({
                "trace": path.display().to_string(),
                "error": err.to_string(),
                "code": err.code(),
            }),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn sweep(trace: &Path, site: Option<u64>, config: &Path) -> Result<()> {
    let spec = load_spec(config)?;
    let trace = trace_io::load_trace_csv(trace, site)?;
    let mistakes = mistake_sweep(&trace, &spec)?;
    println!("{}", serde_json::to_string_pretty(&mistakes)?);
    Ok(())
}

fn rule(
    trace: &Path,
    site: Option<u64>,
    program: &Path,
    base_interval: f64,
    null_probe: bool,
) -> Result<()> {
    let source = std::fs::read_to_string(program)?;
    let spec = DetectorSpec::Rule(fd_config::RuleConfig {
        program: source,
        base_interval,
    });
    let trace = trace_io::load_trace_csv(trace, site)?;
    let probe = pick_probe(null_probe);
    let report = evaluate_spec(&trace, &spec, probe.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
