//! Solver host capability
//!
//! Everything the injection engine needs from the solver environment goes
//! through [`SolverHost`]: the instance meshes of the model, the default
//! deck, job creation from a deck file, running a job and opening its
//! results.

mod deck_mesh;
mod inp_file;

pub use deck_mesh::parse_instances;
pub use inp_file::{request_stress_print, InpFileHost, SolverCommand, STRESS_PRINT_REQUEST};

use std::path::{Path, PathBuf};

use crate::error::HostError;
use crate::mesh::InstanceMesh;
use crate::results::ResultFile;

/// A solver job created from an input deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub name: String,
    pub input_path: PathBuf,
}

pub trait SolverHost {
    /// Whether a job of this name exists
    fn has_job(&self, name: &str) -> bool;

    /// Meshes of every part instance of the job's model, in assembly order
    fn instances(&self, default_job: &str) -> Result<Vec<InstanceMesh>, HostError>;

    /// Write the default input deck of a job and return its text
    fn write_default_input(&mut self, default_job: &str) -> Result<String, HostError>;

    fn create_job_from_input_file(&mut self, job_name: &str, input_path: &Path) -> Result<JobHandle, HostError>;

    /// Run a job and block until it has finished
    fn submit_and_wait(&mut self, job: &JobHandle) -> Result<(), HostError>;

    fn open_result(&mut self, job: &JobHandle) -> Result<ResultFile, HostError>;
}
