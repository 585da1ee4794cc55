use tracing::{info, warn};

use super::{characterize, check_default_job, write_deviations_and_errors, SubstitutionOptions};
use crate::callbacks::Callbacks;
use crate::error::StressFieldResult;
use crate::host::SolverHost;
use crate::job::JobBuilder;
use crate::mesh::define_stresses;

/// Why a substitution run stopped before its last iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// The error function reached the maximum error
    Error,
    /// Stresses changed less than the maximum deviation
    Deviation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionOutcome {
    /// Deviation per iteration, zero for iterations not reached
    pub deviations: Vec<f64>,
    /// Error per iteration when an error function exists, zero for
    /// iterations not reached or whose error function failed
    pub errors: Option<Vec<f64>>,
    /// Number of iterations run
    pub iterations: usize,
    pub converged: Option<Convergence>,
}

/// Run the substitution approach.
///
/// Every iteration recalculates the stresses from the previous ones, runs a
/// job at scale 1 and replaces the stresses with those of the finished job.
/// An iteration that reads back no stress never counts as converged.
pub fn run_substitution(
    host: &mut dyn SolverHost,
    options: &SubstitutionOptions,
    callbacks: &Callbacks,
) -> StressFieldResult<SubstitutionOutcome> {
    info!("Running stress substitution approach");
    options.validate()?;
    check_default_job(host, &options.default_job)?;
    info!("Checks passed");

    let mesh = characterize(host, &options.default_job, callbacks)?;
    info!("Creating job definition");
    let mut builder = JobBuilder::new(host, &options.default_job, mesh, &options.work_dir)?;

    let max_iterations = options.max_iterations;
    let mut deviations = vec![0.0; max_iterations];
    let mut errors = callbacks.error.as_ref().map(|_| vec![0.0; max_iterations]);
    let mut iterations = 0;
    let mut converged = None;

    for i in 0..max_iterations {
        info!("Iteration {} of {}", i + 1, max_iterations);
        iterations = i + 1;

        let failures = define_stresses(builder.mesh_data_mut(), callbacks.stress.as_ref());
        if failures > 0 {
            warn!("{} stress groups have no stress and are left out", failures);
        }

        let job = builder.create_job(host, i + 1, 1.0)?;
        host.submit_and_wait(&job)?;
        let results = host.open_result(&job)?;

        if let (Some(f), Some(errors)) = (&callbacks.error, errors.as_mut()) {
            match f.calculate_error(&results) {
                Ok(error) => {
                    info!("Error = {}", error);
                    errors[i] = error;
                    if error <= options.max_error {
                        info!("Error criterion reached, stopping");
                        converged = Some(Convergence::Error);
                        break;
                    }
                }
                Err(e) => warn!("Error function failed for job {}: {}", job.name, e),
            }
        }

        let read_back = builder.update_stress_from_results(&results);
        deviations[i] = read_back.deviation;
        info!("Deviation = {}", deviations[i]);
        if read_back.updated == 0 {
            warn!("No stresses read back from job {}, deviation criterion not checked", job.name);
            continue;
        }
        if deviations[i] < options.max_deviation {
            info!("Stress deviation criterion reached, stopping");
            converged = Some(Convergence::Deviation);
            break;
        }
    }
    info!("Job logic completed");

    write_deviations_and_errors(&options.work_dir, &deviations, errors.as_deref())?;
    Ok(SubstitutionOutcome {
        deviations,
        errors,
        iterations,
        converged,
    })
}
