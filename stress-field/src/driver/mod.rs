//! Scale and substitution runs
//!
//! Both run kinds share the same preparation: validate options, check the
//! default job, characterize the mesh and build the job template. They then
//! differ in how stresses are scaled or replaced between solver runs.

mod report;
mod scaling;
mod substitution;

pub use report::{write_deviations_and_errors, write_scales_and_errors, REPORT_FILE_NAME};
pub use scaling::{run_scaling, sweep_scales, ScalingOutcome, FAILED_ERROR};
pub use substitution::{run_substitution, Convergence, SubstitutionOutcome};

use std::path::PathBuf;

use tracing::info;

use crate::callbacks::Callbacks;
use crate::elements::MeshData;
use crate::error::{StressFieldError, StressFieldResult};
use crate::host::SolverHost;
use crate::mesh::characterize_mesh;

/// Options of a scaling run
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingOptions {
    pub default_job: String,
    /// Number of scale factors (and jobs)
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// Submit the generated jobs and wait for them
    pub run_jobs: bool,
    /// Seek the scale with minimum error instead of sweeping evenly
    pub iterate: bool,
    pub work_dir: PathBuf,
}

impl ScalingOptions {
    pub fn validate(&self) -> StressFieldResult<()> {
        if self.count < 1 {
            return config("Number of stress scales should be larger than 0");
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return config("Minimum and maximum stress scale should be finite numbers");
        }
        if self.max < self.min {
            return config("Minimum stress scale should be smaller or equal to the maximum stress scale");
        }
        if self.max > self.min && self.count == 1 {
            return config("Unclear stress scale definition, only one count for different min and max");
        }
        if self.max == self.min && self.count > 1 {
            return config("Unclear stress scale definition, multiple counts for equal min and max");
        }
        if self.iterate && !self.run_jobs {
            return config("Can not iterate without running jobs");
        }
        if self.iterate && self.count < 3 {
            return config("At least 3 scale counts are needed to iterate");
        }
        Ok(())
    }
}

/// Options of a substitution run
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionOptions {
    pub default_job: String,
    pub max_iterations: usize,
    /// Stop once the stress deviation between iterations drops below this
    pub max_deviation: f64,
    /// Stop once the error function returns at most this
    pub max_error: f64,
    pub work_dir: PathBuf,
}

impl SubstitutionOptions {
    pub fn validate(&self) -> StressFieldResult<()> {
        if self.max_iterations < 1 {
            return config("Invalid maximum iterations, should be at least 1");
        }
        if self.max_deviation.is_nan() || self.max_deviation <= 0.0 {
            return config("Maximum deviation should be larger than 0");
        }
        if self.max_error.is_nan() || self.max_error <= 0.0 {
            return config("Maximum error should be larger than 0");
        }
        Ok(())
    }
}

fn config<T>(message: &str) -> StressFieldResult<T> {
    Err(StressFieldError::Config(message.to_string()))
}

pub fn check_default_job(host: &dyn SolverHost, default_job: &str) -> StressFieldResult<()> {
    if default_job.is_empty() {
        return config("No default job");
    }
    if !host.has_job(default_job) {
        return Err(StressFieldError::Config(format!("Invalid default job {}", default_job)));
    }
    Ok(())
}

fn characterize(host: &dyn SolverHost, default_job: &str, callbacks: &Callbacks) -> StressFieldResult<MeshData> {
    let instances = host.instances(default_job)?;
    info!("Model of {} has {} part instances", default_job, instances.len());
    characterize_mesh(&instances, callbacks.category.as_deref())
}
