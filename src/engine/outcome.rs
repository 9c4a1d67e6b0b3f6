use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// How the last optimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptStatus {
    NotRun,
    Converged,
    /// ORCA stopped because it used up `opt_cycles`.
    CycleExceeded,
    Failed,
}

/// The result of one ORCA geometry optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    pub job_name: String,
    pub success: bool,
    pub status: OptStatus,
    /// Final single point energy (Hartree). Stays 0.0 unless the run succeeded.
    pub energy: f64,
    /// Same atom order as the input. Empty unless the run succeeded.
    pub optimized_coordinates: Vec<Point3<f64>>,
}

impl CalculationResult {
    pub fn new(job_name: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
            success: false,
            status: OptStatus::NotRun,
            energy: 0.0,
            optimized_coordinates: Vec::new(),
        }
    }
}
