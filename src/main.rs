use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use orca_relax::core::domain::{JobSettings, ScfType};
use orca_relax::core::xyz;
use orca_relax::engine::external::orca::OrcaAdapter;
use orca_relax::engine::outcome::CalculationResult;
use orca_relax::engine::runner::resolve_executable;

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Geometry optimization of molecules with ORCA", long_about = None)]
struct Args {
    /// Starting geometries (XYZ). The file stem becomes the job name.
    #[arg(required = true)]
    geometries: Vec<PathBuf>,

    /// JSON settings file ({"qc": {...}, "opt": {...}, "custom_keyword": ...})
    #[arg(long)]
    params: Option<PathBuf>,

    /// Method, e.g. BP86 or r2SCAN-3c
    #[arg(short, long)]
    method: Option<String>,

    /// Basis set, e.g. def2-SVP
    #[arg(short, long)]
    basis: Option<String>,

    /// ORCA processes per job
    #[arg(short, long)]
    nprocs: Option<usize>,

    #[arg(long)]
    scf_cycles: Option<usize>,

    #[arg(long)]
    opt_cycles: Option<usize>,

    #[arg(long)]
    gamma: Option<f64>,

    #[arg(long)]
    opt_threshold: Option<f64>,

    /// Extra text appended to the `!` keyword line (include the leading space)
    #[arg(long, allow_hyphen_values = true)]
    custom_keyword: Option<String>,

    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    charge: i32,

    #[arg(short = 'u', long, default_value_t = 1)]
    multiplicity: u32,

    /// rhf, uhf or uks
    #[arg(long, default_value = "rhf")]
    scftype: String,

    /// Kill ORCA after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// ORCA binary name or path
    #[arg(long, default_value = "orca")]
    executable: String,

    /// Jobs to run at once; each job works in its own directory
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Directory under which per-job directories are created
    #[arg(long, default_value = ".")]
    work_root: PathBuf,

    /// Write a JSON summary of all jobs here
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct JobReport {
    geometry: PathBuf,
    finished_at: String,
    result: Option<CalculationResult>,
    error: Option<String>,
}

// --- Initialization Helpers ---

fn load_settings(args: &Args) -> Result<JobSettings> {
    let mut settings = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str::<JobSettings>(&text)
                .with_context(|| format!("Invalid settings in {}", path.display()))?
        }
        None => JobSettings::default(),
    };

    // Command-line flags take precedence over the file.
    if let Some(m) = &args.method {
        settings.qc.method = m.clone();
    }
    if let Some(b) = &args.basis {
        settings.qc.basis = b.clone();
    }
    if let Some(n) = args.nprocs {
        settings.qc.nprocs = n;
    }
    if let Some(n) = args.scf_cycles {
        settings.qc.scf_cycles = n;
    }
    if let Some(n) = args.opt_cycles {
        settings.opt.opt_cycles = n;
    }
    if let Some(g) = args.gamma {
        settings.opt.gamma = g;
    }
    if let Some(t) = args.opt_threshold {
        settings.opt.opt_threshold = t;
    }
    if args.timeout.is_some() {
        settings.opt.timeout = args.timeout;
    }
    if args.custom_keyword.is_some() {
        settings.custom_keyword = args.custom_keyword.clone();
    }

    settings.qc.validate()?;
    settings.opt.validate()?;
    Ok(settings)
}

fn check_dependencies(executable: &str) -> Result<()> {
    match resolve_executable(executable) {
        Ok(path) => {
            log::info!("Using ORCA at {}", path.display());
            Ok(())
        }
        Err(_) => Err(anyhow!(
            "Dependency Check Failed: '{}' executable not found in PATH.\n\
             Please install ORCA or add it to your system PATH.",
            executable
        )),
    }
}

fn job_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot derive a job name from {}", path.display()))
}

fn run_job(geometry: &Path, settings: &JobSettings, scftype: ScfType, args: &Args) -> Result<CalculationResult> {
    let name = job_name(geometry)?;
    let molecule = xyz::read_molecule(geometry, &name)
        .with_context(|| format!("Failed to read {}", geometry.display()))?
        .with_charge(args.charge, args.multiplicity)
        .with_scftype(scftype);

    let dir = args.work_root.join(&name);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut adapter = OrcaAdapter::new(&molecule, &settings.qc, settings.custom_keyword.as_deref())?
        .with_executable(&args.executable)
        .with_work_dir(dir);

    adapter
        .optimize(&settings.opt)
        .with_context(|| format!("ORCA job '{}' aborted", name))?;

    Ok(adapter.result().clone())
}

// --- Main ---

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = check_dependencies(&args.executable) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let settings = load_settings(&args)?;
    let scftype: ScfType = args.scftype.parse()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .context("Failed to build job pool")?;

    let reports: Vec<JobReport> = pool.install(|| {
        args.geometries
            .par_iter()
            .map(|geometry| {
                let outcome = run_job(geometry, &settings, scftype, &args);
                if let Err(e) = &outcome {
                    log::error!("{}: {:#}", geometry.display(), e);
                }
                JobReport {
                    geometry: geometry.clone(),
                    finished_at: chrono::Local::now().to_rfc3339(),
                    error: outcome.as_ref().err().map(|e| format!("{:#}", e)),
                    result: outcome.ok(),
                }
            })
            .collect()
    });

    for report in &reports {
        match &report.result {
            Some(r) if r.success => println!("{:<24} {:>18.10} Eh", r.job_name, r.energy),
            Some(r) => println!("{:<24} {:>18}", r.job_name, format!("{:?}", r.status)),
            None => println!("{:<24} {:>18}", report.geometry.display(), "error"),
        }
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    let all_ok = reports
        .iter()
        .all(|r| r.result.as_ref().map_or(false, |res| res.success));
    if !all_ok {
        std::process::exit(1);
    }

    Ok(())
}
