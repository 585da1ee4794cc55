use std::path::Path;

use stress_field::host::SolverCommand;

pub const SOLVER_ENV: &str = "STRESS_FIELD_SOLVER";

/// Solver command from the command line, the environment or the default.
///
/// Jobs run inside the work directory, so a solver given by a relative path
/// that exists is made absolute.
pub fn resolve_solver(flag: Option<&str>, args: &[String]) -> SolverCommand {
    let program = flag
        .map(str::to_string)
        .or_else(|| std::env::var(SOLVER_ENV).ok())
        .unwrap_or_else(|| {
            // Prefer a repo-local solver if present
            if Path::new("./bin/abaqus").exists() {
                "./bin/abaqus".to_string()
            } else {
                "abaqus".to_string()
            }
        });
    let program = std::fs::canonicalize(&program)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or(program);

    let command = SolverCommand::new(program);
    if args.is_empty() {
        command
    } else {
        command.with_args(args.to_vec())
    }
}

/// Warn when the solver cannot be started; jobs will fail until it can
pub fn check_solver(solver: &SolverCommand) {
    match std::process::Command::new(&solver.program).arg("information=release").output() {
        Ok(_) => tracing::info!("Solver found and accessible"),
        Err(e) => {
            tracing::warn!("Solver {} not found or not accessible: {}", solver.program, e);
            tracing::warn!("Set {} or --solver to the correct path", SOLVER_ENV);
        }
    }
}
