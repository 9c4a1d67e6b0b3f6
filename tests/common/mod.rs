#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::Sender;
use nalgebra::Point3;
use orca_relax::core::domain::Molecule;
use orca_relax::engine::error::Result;
use orca_relax::engine::runner::ProcessRunner;

/// Stands in for ORCA: writes canned output files and returns a fixed exit code.
pub struct ScriptedRunner {
    pub exit_code: i32,
    pub output: String,
    /// Contents of the `.xyz` file ORCA would leave next to the input.
    pub xyz: Option<String>,
    /// Receives (executable, args) for every call.
    pub calls: Option<Sender<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new(exit_code: i32, output: &str) -> Self {
        Self {
            exit_code,
            output: output.to_string(),
            xyz: None,
            calls: None,
        }
    }

    pub fn with_xyz(mut self, xyz: &str) -> Self {
        self.xyz = Some(xyz.to_string());
        self
    }

    pub fn with_calls(mut self, tx: Sender<(String, Vec<String>)>) -> Self {
        self.calls = Some(tx);
        self
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(
        &self,
        executable: &str,
        args: &[&str],
        work_dir: &Path,
        sink: &Path,
        _timeout: Option<Duration>,
    ) -> Result<i32> {
        if let Some(tx) = &self.calls {
            let _ = tx.send((executable.to_string(), args.iter().map(|a| a.to_string()).collect()));
        }

        fs::write(sink, &self.output)?;
        if let (Some(xyz), Some(input)) = (&self.xyz, args.first()) {
            let companion = work_dir.join(Path::new(input).with_extension("xyz"));
            fs::write(companion, xyz)?;
        }

        Ok(self.exit_code)
    }
}

pub fn water(name: &str) -> Molecule {
    Molecule::new(
        name,
        vec!["O".into(), "H".into(), "H".into()],
        vec![
            Point3::new(0.0, 0.0, 0.1173),
            Point3::new(0.0, 0.757136, -0.469200),
            Point3::new(0.0, -0.757136, -0.469200),
        ],
    )
    .expect("water")
}

pub fn iron_carbonyl(name: &str) -> Molecule {
    Molecule::new(
        name,
        vec!["Fe".into(), "C".into(), "O".into()],
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.81),
            Point3::new(0.0, 0.0, 2.96),
        ],
    )
    .expect("FeCO")
    .with_charge(0, 3)
}

/// Tail of a normal ORCA run: the marker is followed by the run-time line.
pub fn normal_output(energies: &[&str]) -> String {
    let mut s = String::from("                                 *****************\n");
    s.push_str("                                 * O   R   C   A *\n");
    for (i, e) in energies.iter().enumerate() {
        s.push_str(&format!("        *    GEOMETRY OPTIMIZATION CYCLE   {}     *\n", i + 1));
        s.push_str(&format!("FINAL SINGLE POINT ENERGY       {}\n", e));
    }
    s.push_str("                             ****ORCA TERMINATED NORMALLY****\n");
    s.push_str("TOTAL RUN TIME: 0 days 0 hours 0 minutes 12 seconds 345 msec\n");
    s
}
