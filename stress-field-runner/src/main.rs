mod cli;
mod solver;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, RunArgs, ScaleArgs, SubstituteArgs};
use stress_field::host::SolverCommand;
use stress_field::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stress_field=debug,stress_field_runner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let solver = solver::resolve_solver(cli.solver.as_deref(), &cli.solver_args);
    tracing::info!("Using solver command: {} {}", solver.program, solver.args.join(" "));

    tracing::info!("=== STRESS INPUT START ===");
    let result = match cli.command {
        Command::Scale(args) => scale(args, solver),
        Command::Substitute(args) => substitute(args, solver),
    };
    tracing::info!("=== STRESS INPUT FINISHED ===");
    result
}

fn open(run: &RunArgs, solver: SolverCommand) -> Result<(InpFileHost, Callbacks)> {
    let callbacks = FieldScript::from_file(&run.script)
        .with_context(|| format!("Invalid field script {}", run.script.display()))?
        .into_callbacks();
    let host = InpFileHost::new(&run.deck, &run.work_dir(), solver)
        .with_context(|| format!("Cannot open deck {}", run.deck.display()))?;
    Ok((host, callbacks))
}

fn scale(args: ScaleArgs, solver: SolverCommand) -> Result<()> {
    if args.run_jobs {
        solver::check_solver(&solver);
    }
    let (mut host, callbacks) = open(&args.run, solver)?;
    let options = ScalingOptions {
        default_job: host.default_job().to_string(),
        count: args.count,
        min: args.min,
        max: args.max,
        run_jobs: args.run_jobs,
        iterate: args.iterate,
        work_dir: args.run.work_dir(),
    };

    let outcome = run_scaling(&mut host, &options, &callbacks).context("Scaling run failed")?;
    for (job, scale) in outcome.jobs.iter().zip(&outcome.scales) {
        tracing::info!("{}: stress scale {}", job.name, scale);
    }
    if let Some(errors) = &outcome.errors {
        let best = outcome
            .scales
            .iter()
            .zip(errors)
            .filter(|(_, e)| **e >= 0.0)
            .min_by(|a, b| a.1.total_cmp(b.1));
        if let Some((scale, error)) = best {
            tracing::info!("Lowest error {} at stress scale {}", error, scale);
        }
    }
    Ok(())
}

fn substitute(args: SubstituteArgs, solver: SolverCommand) -> Result<()> {
    solver::check_solver(&solver);
    let (mut host, callbacks) = open(&args.run, solver)?;
    let options = SubstitutionOptions {
        default_job: host.default_job().to_string(),
        max_iterations: args.max_iterations,
        max_deviation: args.max_deviation,
        max_error: args.max_error,
        work_dir: args.run.work_dir(),
    };

    let outcome = run_substitution(&mut host, &options, &callbacks).context("Substitution run failed")?;
    match outcome.converged {
        Some(Convergence::Error) => tracing::info!("Error criterion reached after {} iterations", outcome.iterations),
        Some(Convergence::Deviation) => {
            tracing::info!("Stress deviation criterion reached after {} iterations", outcome.iterations)
        }
        None => tracing::warn!("No convergence within {} iterations", outcome.iterations),
    }
    Ok(())
}
