use tracing::{info, warn};

use super::{characterize, check_default_job, write_scales_and_errors, ScalingOptions};
use crate::callbacks::{Callbacks, ErrorFunction};
use crate::error::{StressFieldError, StressFieldResult};
use crate::host::{JobHandle, SolverHost};
use crate::job::JobBuilder;
use crate::mesh::define_stresses;

/// Error recorded for a job whose error function failed during a sweep
pub const FAILED_ERROR: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScalingOutcome {
    pub scales: Vec<f64>,
    /// Error per scale, present when jobs ran and an error function exists
    pub errors: Option<Vec<f64>>,
    pub jobs: Vec<JobHandle>,
}

/// Run the scaling approach: one job per stress scale factor.
///
/// Stresses are calculated once; every job injects them multiplied by its
/// scale. When errors were computed they are written to the report file in
/// the work directory.
pub fn run_scaling(
    host: &mut dyn SolverHost,
    options: &ScalingOptions,
    callbacks: &Callbacks,
) -> StressFieldResult<ScalingOutcome> {
    info!("Running stress scaling approach");
    options.validate()?;
    check_default_job(host, &options.default_job)?;
    let error_function = match (&callbacks.error, options.run_jobs) {
        (Some(f), true) => Some(f.as_ref()),
        _ => None,
    };
    if options.iterate && error_function.is_none() {
        return Err(StressFieldError::Config(
            "Can not iterate without an error function".to_string(),
        ));
    }
    info!("Checks passed");

    let mut mesh = characterize(host, &options.default_job, callbacks)?;
    info!("Calculating stresses");
    let failures = define_stresses(&mut mesh, callbacks.stress.as_ref());
    if failures > 0 {
        warn!("{} stress groups have no stress and are left out", failures);
    }

    info!("Creating job definition");
    let builder = JobBuilder::new(host, &options.default_job, mesh, &options.work_dir)?;

    let outcome = match error_function {
        Some(f) if options.iterate => iterate(host, &builder, options, f)?,
        _ => sweep(host, &builder, options, error_function)?,
    };
    info!("Job logic completed");

    if let Some(errors) = &outcome.errors {
        info!("Stress scales: {:?}", outcome.scales);
        info!("Errors: {:?}", errors);
        write_scales_and_errors(&options.work_dir, &outcome.scales, errors)?;
    }
    Ok(outcome)
}

/// Evenly spaced scale factors from `min` to `max`
pub fn sweep_scales(count: usize, min: f64, max: f64) -> Vec<f64> {
    if count == 1 {
        return vec![min];
    }
    (0..count)
        .map(|i| min + i as f64 * (max - min) / (count - 1) as f64)
        .collect()
}

fn sweep(
    host: &mut dyn SolverHost,
    builder: &JobBuilder,
    options: &ScalingOptions,
    error_function: Option<&dyn ErrorFunction>,
) -> StressFieldResult<ScalingOutcome> {
    info!("Sweeping stress scale factors");
    let scales = sweep_scales(options.count, options.min, options.max);

    let mut jobs = Vec::with_capacity(scales.len());
    for (i, &scale) in scales.iter().enumerate() {
        jobs.push(builder.create_job(host, i + 1, scale)?);
    }

    if options.run_jobs {
        info!("Running jobs");
        for (i, job) in jobs.iter().enumerate() {
            info!("Running job {} of {}", i + 1, jobs.len());
            host.submit_and_wait(job)?;
        }
    }

    let errors = match error_function {
        Some(f) => {
            info!("Calculating errors");
            let mut errors = Vec::with_capacity(jobs.len());
            for (i, job) in jobs.iter().enumerate() {
                info!("Calculating error for job {} of {}", i + 1, jobs.len());
                let results = host.open_result(job)?;
                let error = f.calculate_error(&results).unwrap_or_else(|e| {
                    warn!("Error function failed for job {}: {}", job.name, e);
                    FAILED_ERROR
                });
                errors.push(error);
            }
            Some(errors)
        }
        None => None,
    };

    Ok(ScalingOutcome { scales, errors, jobs })
}

/// Seek the scale with minimum error: the first two jobs run at `min` and
/// `max`, every further job at the mean of the best scale so far and the
/// scale of the most recent other job.
fn iterate(
    host: &mut dyn SolverHost,
    builder: &JobBuilder,
    options: &ScalingOptions,
    error_function: &dyn ErrorFunction,
) -> StressFieldResult<ScalingOutcome> {
    info!("Iterating for minimum error");
    let count = options.count;
    let mut scales = vec![0.0; count];
    let mut errors = vec![0.0; count];
    let mut jobs = Vec::with_capacity(count);
    let mut min_index = 0;
    let mut previous_index = 0;

    for i in 0..count {
        scales[i] = match i {
            0 => options.min,
            1 => options.max,
            _ => (scales[min_index] + scales[previous_index]) / 2.0,
        };
        info!("Creating job for stress factor {}", scales[i]);
        let job = builder.create_job(host, i + 1, scales[i])?;

        info!("Running job {} of {}", i + 1, count);
        host.submit_and_wait(&job)?;
        let results = host.open_result(&job)?;
        errors[i] = error_function.calculate_error(&results).map_err(|e| {
            warn!("Error function failed for job {}, aborting", job.name);
            StressFieldError::Callback(e)
        })?;
        info!("Error = {}", errors[i]);
        jobs.push(job);

        match i {
            0 => min_index = 0,
            1 => {
                if errors[1] < errors[min_index] {
                    min_index = 1;
                    previous_index = 0;
                } else {
                    previous_index = 1;
                }
            }
            _ => {
                if errors[i] < errors[min_index] {
                    previous_index = min_index;
                    min_index = i;
                } else {
                    previous_index = i;
                }
            }
        }
    }

    Ok(ScalingOutcome {
        scales,
        errors: Some(errors),
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sweep_scales() {
        assert_eq!(sweep_scales(1, 0.7, 0.7), vec![0.7]);
        let scales = sweep_scales(5, -1.0, 1.0);
        assert_eq!(scales.len(), 5);
        for (s, expected) in scales.iter().zip([-1.0, -0.5, 0.0, 0.5, 1.0]) {
            assert_relative_eq!(*s, expected);
        }
    }
}
