use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use lazy_static::lazy_static;
use nalgebra::Point3;
use regex::Regex;

use crate::core::chemistry;
use crate::core::domain::{Molecule, OptOptions, QcParams, ScfType};
use crate::core::xyz;
use crate::engine::error::{OrcaError, Result};
use crate::engine::journal::Journal;
use crate::engine::outcome::{CalculationResult, OptStatus};
use crate::engine::runner::{ProcessRunner, SystemRunner};

pub const TERMINATION_MARKER: &str = "****ORCA TERMINATED NORMALLY****";
pub const ENERGY_MARKER: &str = "FINAL SINGLE POINT ENERGY";

/// Numerical defaults applied to every job: RI-J fitting, D3(BJ) dispersion, KDIIS.
const ACCELERATION_KEYWORDS: &str = " RI def2/J D3BJ KDIIS";

lazy_static! {
    static ref OPT_CYCLE_RE: Regex = Regex::new(r"GEOMETRY OPTIMIZATION CYCLE\s+(\d+)").unwrap();
    // ORCA wraps this sentence over two lines.
    static ref CYCLE_LIMIT_RE: Regex =
        Regex::new(r"reached the maximum number of\s+optimization cycles").unwrap();
}

/// Drives one ORCA geometry optimization through input files on disk.
///
/// An adapter is bound to a single job name and is meant for a single
/// `optimize` call. Energy and coordinates are read back from the adapter
/// afterwards.
pub struct OrcaAdapter {
    executable: String,
    runner: Box<dyn ProcessRunner>,
    journal: Journal,
    work_dir: PathBuf,

    job_name: String,
    atoms_list: Vec<String>,
    start_coords: Vec<Point3<f64>>,
    charge: i32,
    multiplicity: u32,

    keyword: String,
    inp_file: String,
    out_file: String,
    xyz_file: String,
    result_xyz_file: String,

    /// Set once `optimize` has touched the keyword, even if it later errors out.
    started: bool,
    result: CalculationResult,
}

impl OrcaAdapter {
    /// Creates the adapter and assembles the keyword block.
    ///
    /// # Arguments
    /// * `molecule` - Source of atoms, charge and multiplicity. Coordinates are copied now.
    /// * `qc_params` - Method, basis, process count and SCF iteration cap.
    /// * `custom_keyword` - Appended verbatim to the `!` line.
    pub fn new(molecule: &Molecule, qc_params: &QcParams, custom_keyword: Option<&str>) -> Result<Self> {
        qc_params.validate()?;

        let job_name = molecule.name.clone();
        let keyword = build_keyword(molecule, qc_params, custom_keyword);

        Ok(Self {
            executable: "orca".to_string(),
            runner: Box::new(SystemRunner),
            journal: Journal::default(),
            work_dir: PathBuf::from("."),
            atoms_list: molecule.atoms_list.clone(),
            start_coords: molecule.coordinates.clone(),
            charge: molecule.charge,
            multiplicity: molecule.multiplicity,
            keyword,
            inp_file: format!("trial_{}.inp", job_name),
            out_file: format!("trial_{}.out", job_name),
            xyz_file: format!("trial_{}.xyz", job_name),
            result_xyz_file: format!("result_{}.xyz", job_name),
            started: false,
            result: CalculationResult::new(&job_name),
            job_name,
        })
    }

    pub fn with_executable(mut self, executable: &str) -> Self {
        self.executable = executable.to_string();
        self
    }

    pub fn with_runner(mut self, runner: Box<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Directory that holds the job's files and in which ORCA runs.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn input_path(&self) -> PathBuf {
        self.work_dir.join(&self.inp_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.out_file)
    }

    /// Optimized geometry written by ORCA next to the input file.
    pub fn orca_xyz_path(&self) -> PathBuf {
        self.work_dir.join(&self.xyz_file)
    }

    pub fn result_xyz_path(&self) -> PathBuf {
        self.work_dir.join(&self.result_xyz_file)
    }

    pub fn energy(&self) -> f64 {
        self.result.energy
    }

    pub fn optimized_coordinates(&self) -> &[Point3<f64>] {
        &self.result.optimized_coordinates
    }

    pub fn status(&self) -> OptStatus {
        self.result.status
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    /// Renders the ORCA input deck from the keyword and the coordinate snapshot.
    pub fn generate_input(&self) -> String {
        let mut s = String::with_capacity(self.keyword.len() + 48 * (self.atoms_list.len() + 2));

        s.push_str(&self.keyword);
        s.push('\n');
        let _ = writeln!(s, "*xyz {} {}", self.charge, self.multiplicity);
        for (symbol, p) in self.atoms_list.iter().zip(&self.start_coords) {
            let _ = writeln!(s, " {:>3}  {:10.7}  {:10.7} {:10.7}", symbol, p.x, p.y, p.z);
        }
        s.push('*');

        s
    }

    /// Writes `trial_<job>.inp`, replacing any previous file.
    pub fn prepare_input(&self) -> Result<()> {
        fs::write(self.input_path(), self.generate_input())?;
        Ok(())
    }

    /// Runs the optimization and reports whether ORCA finished normally.
    ///
    /// Filesystem problems and timeouts are errors. A failed ORCA run is
    /// `Ok(false)` with the reason on the error channel.
    pub fn optimize(&mut self, options: &OptOptions) -> Result<bool> {
        options.validate()?;
        if self.started {
            return Err(OrcaError::Config(format!(
                "adapter for '{}' has already run an optimization",
                self.job_name
            )));
        }

        self.journal.trace(format!(
            "Optimizing {} ({} atoms) with ORCA, max {} cycles",
            self.job_name,
            self.atoms_list.len(),
            options.opt_cycles
        ));
        self.journal.trace(format!(
            "gamma = {}, opt_threshold = {} are left to ORCA's own convergence criteria",
            options.gamma, options.opt_threshold
        ));

        self.started = true;
        self.keyword.push_str("!Opt");
        let _ = write!(self.keyword, "\n%geom maxiter {} end", options.opt_cycles);
        self.prepare_input()?;

        let out_path = self.output_path();
        let timeout = options.timeout.map(Duration::from_secs);
        let exit_code = self.runner.run(
            &self.executable,
            &[self.inp_file.as_str()],
            &self.work_dir,
            &out_path,
            timeout,
        )?;
        self.journal.trace(format!("ORCA exited with code {}", exit_code));

        let output = String::from_utf8_lossy(&fs::read(&out_path)?).into_owned();

        if exit_code != 0 || !terminated_normally(&output) {
            self.result.status = if cycles_exhausted(&output, options.opt_cycles) {
                OptStatus::CycleExceeded
            } else {
                OptStatus::Failed
            };
            self.journal.error(format!(
                "Error: Optimization probably failed (exit code {}, status {:?}).\n\
                 Check the .out file for partial details at {}",
                exit_code,
                self.result.status,
                self.display_dir()
            ));
            return Ok(false);
        }

        let energy = match self.get_energy() {
            Some(e) => e,
            None => {
                self.result.status = OptStatus::Failed;
                self.journal.error(format!(
                    "Error: no usable energy in {} at {}",
                    self.out_file,
                    self.display_dir()
                ));
                return Ok(false);
            }
        };

        let coords = xyz::read_coordinates(&self.orca_xyz_path(), self.atoms_list.len())?;
        xyz::write_xyz(&self.result_xyz_path(), &self.job_name, &self.atoms_list, &coords, energy)?;

        self.result.energy = energy;
        self.result.optimized_coordinates = coords;
        self.result.status = OptStatus::Converged;
        self.result.success = true;

        self.journal.trace(format!("{} converged, E = {:.8} Eh", self.job_name, energy));
        Ok(true)
    }

    /// Reads the last `FINAL SINGLE POINT ENERGY` (Hartree) from the output file.
    ///
    /// Returns `Some(0.0)` when the file has no energy line and `None` when the
    /// file cannot be read or the value does not parse.
    pub fn get_energy(&self) -> Option<f64> {
        let path = self.output_path();
        let text = match fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                self.journal.error(format!("Warning: File {} was not found ({})", path.display(), e));
                return None;
            }
        };

        match parse_final_energy(&text) {
            Ok(energy) => Some(energy.unwrap_or(0.0)),
            Err(token) => {
                self.journal.error(format!("Cannot read energy '{}' in {}", token, path.display()));
                None
            }
        }
    }

    fn display_dir(&self) -> String {
        fs::canonicalize(&self.work_dir)
            .unwrap_or_else(|_| self.work_dir.clone())
            .display()
            .to_string()
    }
}

fn build_keyword(molecule: &Molecule, qc_params: &QcParams, custom_keyword: Option<&str>) -> String {
    let mut keyword = format!("! {} {}", qc_params.method, qc_params.basis);

    if chemistry::needs_ecp(&molecule.atomic_number) {
        keyword.push_str(" def2-ECP");
    }
    keyword.push_str(ACCELERATION_KEYWORDS);
    if molecule.scftype == ScfType::Uks {
        keyword.push_str(" UKS");
    }
    if let Some(custom) = custom_keyword {
        keyword.push_str(custom);
    }
    let _ = write!(keyword, "\n%pal nprocs {} end\n", qc_params.nprocs);
    let _ = write!(keyword, "%scf maxiter {} end\n", qc_params.scf_cycles);

    keyword
}

/// The marker must sit on the second-to-last line; ORCA prints the run time after it.
fn terminated_normally(output: &str) -> bool {
    output
        .lines()
        .rev()
        .nth(1)
        .map_or(false, |line| line.contains(TERMINATION_MARKER))
}

/// `Ok(None)` if no energy line exists, `Err(token)` if the last one is unparsable.
fn parse_final_energy(output: &str) -> std::result::Result<Option<f64>, String> {
    let last = output.lines().filter(|l| l.contains(ENERGY_MARKER)).last();
    let Some(line) = last else { return Ok(None) };

    let token = line.split_whitespace().last().unwrap_or_default();
    token.parse::<f64>().map(Some).map_err(|_| token.to_string())
}

fn cycles_exhausted(output: &str, opt_cycles: usize) -> bool {
    if CYCLE_LIMIT_RE.is_match(output) {
        return true;
    }
    OPT_CYCLE_RE
        .captures_iter(output)
        .filter_map(|c| c[1].parse::<usize>().ok())
        .max()
        .map_or(false, |last| last >= opt_cycles)
}
