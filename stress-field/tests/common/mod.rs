//! Shared fixtures: an Abaqus/CAE style deck and an in-memory solver host
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use stress_field::deck::{ELSET_KEYWORD, INITIAL_STRESS_KEYWORD};
use stress_field::prelude::*;

pub const JOB: &str = "Job-1";

/// Abaqus `.dat` output of a job that printed no element stresses
pub const DAT_WITHOUT_STRESSES: &str = "
                                   E L E M E N T   O U T P U T

 THE FOLLOWING TABLE IS PRINTED AT THE CENTROID OF THE ELEMENT FOR ELEMENT TYPE C3D8R AND ELEMENT SET EALL

    ELEMENT  FOOT-       E11         E22         E33
             NOTE

         1           1.000E-03   0.000E+00   0.000E+00
";

/// Deck with one strip of unit hex elements along X per part
pub fn strip_deck(parts: &[(&str, usize)]) -> String {
    let mut inp = String::from("*Heading\n** Job name: Job-1 Model name: Model-1\n**\n** PARTS\n**\n");
    for &(part, count) in parts {
        inp.push_str(&format!("*Part, name={}\n*Node\n", part));
        for i in 0..=count {
            for (j, (y, z)) in [(0, 0), (1, 0), (1, 1), (0, 1)].iter().enumerate() {
                inp.push_str(&format!("{:>7}, {:>4}., {:>4}., {:>4}.\n", 4 * i + j + 1, i, y, z));
            }
        }
        inp.push_str("*Element, type=C3D8R\n");
        for label in 1..=count {
            let a = 4 * (label - 1) + 1;
            let nodes: Vec<String> = (a..a + 8).map(|n| n.to_string()).collect();
            inp.push_str(&format!("{}, {}\n", label, nodes.join(", ")));
        }
        inp.push_str(&format!("*Elset, elset=Set-All, generate\n 1, {}, 1\n", count));
        inp.push_str("** Section: Section-1\n*Solid Section, elset=Set-All, material=Steel\n,\n*End Part\n**\n");
    }
    inp.push_str("**\n** ASSEMBLY\n**\n*Assembly, name=Assembly\n**\n");
    for &(part, _) in parts {
        inp.push_str(&format!("*Instance, name={}-1, part={}\n*End Instance\n**\n", part, part));
    }
    inp.push_str("*End Assembly\n**\n** MATERIALS\n**\n*Material, name=Steel\n*Elastic\n200000., 0.3\n");
    inp.push_str("** \n** BOUNDARY CONDITIONS\n** \n** Name: BC-1 Type: Symmetry/Antisymmetry/Encastre\n*Boundary\n");
    if let Some(&(part, _)) = parts.first() {
        inp.push_str(&format!("{}-1.Set-All, ENCASTRE\n", part));
    }
    inp.push_str("** ----------------------------------------------------------------\n");
    inp.push_str("** \n** STEP: Step-1\n** \n*Step, name=Step-1, nlgeom=NO\n*Static\n1., 1., 1e-05, 1.\n");
    inp.push_str("** ----------------------------------------------------------------\n*End Step\n");
    inp
}

/// Solver host that "solves" a job by reading back the stress block of its
/// deck, multiplied by `response`
pub struct MockHost {
    pub deck: String,
    pub response: f64,
    /// Whether solved jobs print element stresses
    pub stress_output: bool,
    pub created: Vec<JobHandle>,
    pub submitted: Vec<String>,
}

impl MockHost {
    pub fn new(parts: &[(&str, usize)]) -> Self {
        Self {
            deck: strip_deck(parts),
            response: 1.0,
            stress_output: true,
            created: Vec::new(),
            submitted: Vec::new(),
        }
    }

    pub fn with_response(mut self, response: f64) -> Self {
        self.response = response;
        self
    }

    pub fn without_stress_output(mut self) -> Self {
        self.stress_output = false;
        self
    }
}

/// Labels of every injected element set of a deck
fn injected_sets(lines: &[&str]) -> HashMap<String, Vec<u64>> {
    let mut sets = HashMap::new();
    let mut current: Option<String> = None;
    for line in lines {
        if let Some(name) = line.strip_prefix(ELSET_KEYWORD) {
            current = name.starts_with("stress_field_").then(|| name.to_string());
            continue;
        }
        if line.starts_with('*') {
            current = None;
            continue;
        }
        if let Some(name) = &current {
            let labels = line.split(',').map(str::trim).filter(|v| !v.is_empty()).map(|v| v.parse::<u64>().unwrap());
            sets.entry(name.clone()).or_insert_with(Vec::new).extend(labels);
        }
    }
    sets
}

impl SolverHost for MockHost {
    fn has_job(&self, name: &str) -> bool {
        name == JOB || self.created.iter().any(|j| j.name == name)
    }

    fn instances(&self, _default_job: &str) -> Result<Vec<InstanceMesh>, HostError> {
        parse_instances(&self.deck)
    }

    fn write_default_input(&mut self, _default_job: &str) -> Result<String, HostError> {
        Ok(self.deck.clone())
    }

    fn create_job_from_input_file(&mut self, job_name: &str, input_path: &Path) -> Result<JobHandle, HostError> {
        let job = JobHandle {
            name: job_name.to_string(),
            input_path: input_path.to_path_buf(),
        };
        self.created.push(job.clone());
        Ok(job)
    }

    fn submit_and_wait(&mut self, job: &JobHandle) -> Result<(), HostError> {
        self.submitted.push(job.name.clone());
        Ok(())
    }

    fn open_result(&mut self, job: &JobHandle) -> Result<ResultFile, HostError> {
        if !self.stress_output {
            return ResultFile::parse_dat(DAT_WITHOUT_STRESSES);
        }
        let text = fs::read_to_string(&job.input_path).map_err(|e| HostError::IoError(e.to_string()))?;
        let lines: Vec<&str> = text.lines().collect();
        let sets = injected_sets(&lines);

        let start = lines
            .iter()
            .position(|l| *l == INITIAL_STRESS_KEYWORD)
            .ok_or_else(|| HostError::ParsingError("no stress block".into()))?;
        let mut values = Vec::new();
        for line in lines[start + 1..].iter().take_while(|l| !l.starts_with("**")) {
            let mut fields = line.trim_end_matches(',').split(',');
            let target = fields.next().unwrap_or_default();
            let (instance, set) = target.split_once('.').unwrap();
            let components: Vec<f64> = fields.map(|v| v.parse::<f64>().unwrap() * self.response).collect();
            let stress = StressTensor::new(components.try_into().unwrap());
            for &label in &sets[set] {
                values.push(CentroidStress {
                    instance: Some(instance.to_uppercase()),
                    label,
                    stress,
                });
            }
        }
        Ok(ResultFile {
            steps: vec![ResultStep {
                name: "Step-1".into(),
                frames: vec![ResultFrame { time: Some(1.0), values }],
            }],
        })
    }
}

/// Mean S11 over the last frame
pub fn mean_s11(results: &ResultFile) -> Option<f64> {
    let values = &results.last_frame()?.values;
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|v| v.stress.0[0]).sum::<f64>() / values.len() as f64)
}

pub fn uniform_stress(value: f64) -> impl Fn(&str, f64, f64, f64, &StressTensor) -> Result<StressTensor, CallbackError> {
    move |_part: &str, _x: f64, _y: f64, _z: f64, _prev: &StressTensor| Ok(StressTensor::new([value; 6]))
}

pub fn work_dir(root: &Path) -> PathBuf {
    root.join("work")
}
