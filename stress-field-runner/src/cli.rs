use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stress-field-runner", version, about = "Inject initial stress fields into solver input decks")]
pub struct Cli {
    /// Solver executable (falls back to STRESS_FIELD_SOLVER, then `abaqus`)
    #[arg(long, global = true)]
    pub solver: Option<String>,

    /// Solver argument, repeatable; `{job}` and `{input}` are substituted
    #[arg(long = "solver-arg", global = true, allow_hyphen_values = true)]
    pub solver_args: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create one job per stress scale factor
    Scale(ScaleArgs),
    /// Iteratively replace stresses by the results of the previous job
    Substitute(SubstituteArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Default input deck; the job is named after its file stem
    #[arg(long)]
    pub deck: PathBuf,

    /// JSON field script with the stress, category and error functions
    #[arg(long)]
    pub script: PathBuf,

    /// Directory for generated decks, results and the report
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

impl RunArgs {
    /// The work directory, defaulting to the deck's directory
    pub fn work_dir(&self) -> PathBuf {
        match &self.work_dir {
            Some(dir) => dir.clone(),
            None => match self.deck.parent() {
                Some(parent) if parent != Path::new("") => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ScaleArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Number of stress scales
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub min: f64,

    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub max: f64,

    /// Submit the jobs and wait for them
    #[arg(long)]
    pub run_jobs: bool,

    /// Seek the scale with minimum error (needs --run-jobs and an error function)
    #[arg(long)]
    pub iterate: bool,
}

#[derive(Args, Debug)]
pub struct SubstituteArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[arg(long, default_value_t = 10)]
    pub max_iterations: usize,

    /// Stop when stresses change less than this between iterations
    #[arg(long)]
    pub max_deviation: f64,

    /// Stop when the error function returns at most this
    #[arg(long)]
    pub max_error: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scale() {
        let cli = Cli::try_parse_from([
            "stress-field-runner",
            "scale",
            "--deck",
            "models/Job-1.inp",
            "--script",
            "field.json",
            "--count",
            "3",
            "--min",
            "-1",
            "--max",
            "1",
            "--run-jobs",
        ])
        .unwrap();
        let Command::Scale(args) = cli.command else {
            panic!("expected scale");
        };
        assert_eq!(args.count, 3);
        assert_eq!(args.min, -1.0);
        assert!(args.run_jobs);
        assert!(!args.iterate);
        assert_eq!(args.run.work_dir(), PathBuf::from("models"));
    }

    #[test]
    fn test_parse_substitute_with_solver() {
        let cli = Cli::try_parse_from([
            "stress-field-runner",
            "substitute",
            "--deck",
            "Job-1.inp",
            "--script",
            "field.json",
            "--max-deviation",
            "0.5",
            "--max-error",
            "0.1",
            "--solver",
            "/opt/solver/bin/run",
            "--solver-arg",
            "{job}",
        ])
        .unwrap();
        assert_eq!(cli.solver.as_deref(), Some("/opt/solver/bin/run"));
        assert_eq!(cli.solver_args, vec!["{job}"]);
        let Command::Substitute(args) = cli.command else {
            panic!("expected substitute");
        };
        assert_eq!(args.max_iterations, 10);
        assert_eq!(args.run.work_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_missing_deck_is_rejected() {
        assert!(Cli::try_parse_from(["stress-field-runner", "scale", "--script", "field.json"]).is_err());
    }
}
