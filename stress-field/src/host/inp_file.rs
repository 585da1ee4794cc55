use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{parse_instances, JobHandle, SolverHost};
use crate::deck::DeckBuffer;
use crate::error::HostError;
use crate::mesh::InstanceMesh;
use crate::results::ResultFile;

/// External solver invocation.
///
/// `{job}` and `{input}` in the arguments are replaced by the job name and
/// the input deck path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SolverCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn arguments(&self, job: &str, input: &Path) -> Vec<String> {
        let input = input.display().to_string();
        self.args
            .iter()
            .map(|a| a.replace("{job}", job).replace("{input}", &input))
            .collect()
    }
}

impl Default for SolverCommand {
    fn default() -> Self {
        Self {
            program: "abaqus".to_string(),
            args: vec![
                "job={job}".to_string(),
                "input={input}".to_string(),
                "interactive".to_string(),
            ],
        }
    }
}

/// Output request for the centroid stresses read back from the `.dat` file
pub const STRESS_PRINT_REQUEST: [&str; 2] = ["*El Print, position=CENTROIDAL", "S"];

/// Add [`STRESS_PRINT_REQUEST`] to the last step of a deck that prints no
/// element output. Returns whether the deck changed.
pub fn request_stress_print(deck: &mut DeckBuffer) -> bool {
    let has_print = deck
        .lines()
        .iter()
        .any(|l| l.trim_start().to_ascii_lowercase().starts_with("*el print"));
    if has_print {
        return false;
    }
    let Some(end_step) = deck
        .lines()
        .iter()
        .rposition(|l| l.trim_start().to_ascii_lowercase().starts_with("*end step"))
    else {
        tracing::warn!("Deck has no *End Step, element stresses will not be printed");
        return false;
    };
    for (offset, line) in STRESS_PRINT_REQUEST.iter().enumerate() {
        deck.insert(end_step + offset, *line);
    }
    true
}

/// Solver host backed by an input deck on disk and an external solver
pub struct InpFileHost {
    default_input: PathBuf,
    default_job: String,
    work_dir: PathBuf,
    solver: SolverCommand,
    jobs: HashMap<String, PathBuf>,
}

impl InpFileHost {
    /// The default job is named after the deck's file stem
    pub fn new(default_input: &Path, work_dir: &Path, solver: SolverCommand) -> Result<Self, HostError> {
        if !default_input.is_file() {
            return Err(HostError::IoError(format!("No input deck at {}", default_input.display())));
        }
        let default_job = default_input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| HostError::IoError(format!("Bad deck file name {}", default_input.display())))?
            .to_string();
        fs::create_dir_all(work_dir)
            .map_err(|e| HostError::IoError(format!("Failed to create work directory: {}", e)))?;

        tracing::info!("Default job {} from {:?}", default_job, default_input);
        Ok(Self {
            default_input: default_input.to_path_buf(),
            default_job,
            work_dir: work_dir.to_path_buf(),
            solver,
            jobs: HashMap::new(),
        })
    }

    pub fn default_job(&self) -> &str {
        &self.default_job
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn read_default_input(&self, default_job: &str) -> Result<String, HostError> {
        if default_job != self.default_job {
            return Err(HostError::UnknownJob(default_job.to_string()));
        }
        fs::read_to_string(&self.default_input)
            .map_err(|e| HostError::IoError(format!("Failed to read {}: {}", self.default_input.display(), e)))
    }
}

impl SolverHost for InpFileHost {
    fn has_job(&self, name: &str) -> bool {
        name == self.default_job || self.jobs.contains_key(name)
    }

    fn instances(&self, default_job: &str) -> Result<Vec<InstanceMesh>, HostError> {
        let text = self.read_default_input(default_job)?;
        parse_instances(&text)
    }

    fn write_default_input(&mut self, default_job: &str) -> Result<String, HostError> {
        let text = self.read_default_input(default_job)?;
        let path = self.work_dir.join(format!("{}.inp", default_job));
        let same_file = match (path.canonicalize(), self.default_input.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            fs::write(&path, &text).map_err(|e| HostError::IoError(format!("Failed to write .inp file: {}", e)))?;
            tracing::debug!("Wrote default input to {:?}", path);
        }
        Ok(text)
    }

    fn create_job_from_input_file(&mut self, job_name: &str, input_path: &Path) -> Result<JobHandle, HostError> {
        if !input_path.is_file() {
            return Err(HostError::IoError(format!("No input file at {}", input_path.display())));
        }
        let text = fs::read_to_string(input_path)
            .map_err(|e| HostError::IoError(format!("Failed to read {}: {}", input_path.display(), e)))?;
        let mut deck = DeckBuffer::from_text(&text);
        if request_stress_print(&mut deck) {
            fs::write(input_path, deck.to_text())
                .map_err(|e| HostError::IoError(format!("Failed to write .inp file: {}", e)))?;
            tracing::debug!("Added centroid stress print request to {:?}", input_path);
        }
        self.jobs.insert(job_name.to_string(), input_path.to_path_buf());
        Ok(JobHandle {
            name: job_name.to_string(),
            input_path: input_path.to_path_buf(),
        })
    }

    fn submit_and_wait(&mut self, job: &JobHandle) -> Result<(), HostError> {
        if !self.jobs.contains_key(&job.name) {
            return Err(HostError::UnknownJob(job.name.clone()));
        }
        let input = job.input_path.canonicalize().unwrap_or_else(|_| job.input_path.clone());
        let args = self.solver.arguments(&job.name, &input);

        tracing::info!("Running command: {} {}", self.solver.program, args.join(" "));
        let output = Command::new(&self.solver.program)
            .args(&args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| HostError::ExecutionError(format!("Failed to execute {}: {}", self.solver.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::error!("Job {} failed. Stderr: {}\nStdout: {}", job.name, stderr, stdout);
            return Err(HostError::AnalysisFailed(format!(
                "{} exited with status {}. Check logs.",
                self.solver.program, output.status
            )));
        }
        tracing::info!("Job {} completed", job.name);
        Ok(())
    }

    fn open_result(&mut self, job: &JobHandle) -> Result<ResultFile, HostError> {
        ResultFile::from_dat_file(&self.work_dir.join(format!("{}.dat", job.name)))
    }
}
