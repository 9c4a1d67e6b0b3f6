use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::core::chemistry;
use crate::engine::error::{OrcaError, Result};

// --- Molecule ---

/// SCF reference requested for the molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScfType {
    #[default]
    Rhf,
    Uhf,
    /// Unrestricted Kohn-Sham; the only variant that adds `UKS` to the keyword line.
    Uks,
}

impl FromStr for ScfType {
    type Err = OrcaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rhf" => Ok(Self::Rhf),
            "uhf" => Ok(Self::Uhf),
            "uks" => Ok(Self::Uks),
            other => Err(OrcaError::Config(format!("unknown SCF type '{}'", other))),
        }
    }
}

impl fmt::Display for ScfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rhf => "rhf",
            Self::Uhf => "uhf",
            Self::Uks => "uks",
        };
        f.write_str(s)
    }
}

/// A molecule handed to the adapter by the optimization workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Molecule {
    /// Job name; all file names are derived from it.
    pub name: String,
    pub atoms_list: Vec<String>,
    pub atomic_number: Vec<u8>,
    pub coordinates: Vec<Point3<f64>>, // Å
    pub charge: i32,
    pub multiplicity: u32,
    pub scftype: ScfType,
}

impl Molecule {
    /// Builds a neutral singlet, resolving atomic numbers from the symbols.
    pub fn new(name: &str, atoms_list: Vec<String>, coordinates: Vec<Point3<f64>>) -> Result<Self> {
        if atoms_list.len() != coordinates.len() {
            return Err(OrcaError::Config(format!(
                "molecule '{}' has {} symbols but {} coordinates",
                name,
                atoms_list.len(),
                coordinates.len()
            )));
        }

        let atomic_number = atoms_list
            .iter()
            .map(|s| chemistry::atomic_number(s).ok_or_else(|| OrcaError::UnknownElement(s.clone())))
            .collect::<Result<Vec<u8>>>()?;

        Ok(Self {
            name: name.to_string(),
            atoms_list,
            atomic_number,
            coordinates,
            charge: 0,
            multiplicity: 1,
            scftype: ScfType::default(),
        })
    }

    pub fn with_charge(mut self, charge: i32, multiplicity: u32) -> Self {
        self.charge = charge;
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_scftype(mut self, scftype: ScfType) -> Self {
        self.scftype = scftype;
        self
    }

    pub fn number_of_atoms(&self) -> usize {
        self.atoms_list.len()
    }
}

// --- Configuration Types ---

/// Level of theory and resources for one ORCA job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcParams {
    pub method: String,
    pub basis: String,
    pub nprocs: usize,
    pub scf_cycles: usize,
}

impl Default for QcParams {
    fn default() -> Self {
        Self {
            method: "BP86".to_string(),
            basis: "def2-SVP".to_string(),
            nprocs: 1,
            scf_cycles: 100,
        }
    }
}

impl QcParams {
    pub fn validate(&self) -> Result<()> {
        if self.method.trim().is_empty() {
            return Err(OrcaError::Config("method must not be empty".into()));
        }
        if self.basis.trim().is_empty() {
            return Err(OrcaError::Config("basis must not be empty".into()));
        }
        if self.nprocs == 0 {
            return Err(OrcaError::Config("nprocs must be positive".into()));
        }
        if self.scf_cycles == 0 {
            return Err(OrcaError::Config("scf_cycles must be positive".into()));
        }
        Ok(())
    }
}

/// Options for a geometry optimization.
///
/// `gamma` and `opt_threshold` are carried for the workflow's benefit; ORCA
/// uses its own convergence criteria, so the adapter only logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptOptions {
    pub opt_cycles: usize,
    pub gamma: f64,
    pub opt_threshold: f64,
    /// Wall-clock limit for the ORCA process, in seconds. `None` waits forever.
    pub timeout: Option<u64>,
}

impl Default for OptOptions {
    fn default() -> Self {
        Self {
            opt_cycles: 100,
            gamma: 0.0,
            opt_threshold: 1e-4,
            timeout: None,
        }
    }
}

impl OptOptions {
    pub fn validate(&self) -> Result<()> {
        if self.opt_cycles == 0 {
            return Err(OrcaError::Config("opt_cycles must be positive".into()));
        }
        if self.timeout == Some(0) {
            return Err(OrcaError::Config("timeout must be positive when set".into()));
        }
        Ok(())
    }
}

/// Settings file accepted by the CLI (`--params`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub qc: QcParams,
    pub opt: OptOptions,
    pub custom_keyword: Option<String>,
}
