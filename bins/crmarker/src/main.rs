mod artifact;
mod commands;
mod config;
mod engine;
mod evaluator;
mod executor;
mod guard;
mod remap;
mod workspace;


use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use commands::Source;
use config::Overrides;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "crmarker")]
#[command(about = "Mark a student's code fragment by running it between instructor prefix and suffix code", long_about = None)]
struct Cli {
    /// Marker config file (defaults to config/marker.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a submission and print the verdict as one JSON line
    #[command(group(ArgGroup::new("input").required(true).args(["request", "student"])))]
    Mark {
        /// JSON marking request with prefix, student_code and suffix
        #[arg(long, conflicts_with_all = ["prefix", "student", "suffix"])]
        request: Option<PathBuf>,

        /// Instructor code placed before the submission
        #[arg(short, long)]
        prefix: Option<PathBuf>,

        /// The student's code ("-" reads standard input)
        #[arg(short, long)]
        student: Option<PathBuf>,

        /// Instructor code placed after the submission
        #[arg(long)]
        suffix: Option<PathBuf>,

        /// Reject submissions containing "import" without running them
        #[arg(long, default_value = "false")]
        ban_imports: bool,

        /// Interpreter override (e.g., python3.12)
        #[arg(short, long)]
        interpreter: Option<String>,

        /// Timeout override in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Directory the per-run working directories are created in
        #[arg(long)]
        work_root: Option<PathBuf>,
    },

    /// Print a zero verdict if the submission contains "import"
    BanImports {
        /// The student's code ("-" reads standard input)
        #[arg(short, long)]
        student: PathBuf,

        /// Exit with status 1 instead of 0 after rejecting, so scripts can continue
        #[arg(long, default_value = "false")]
        no_exit: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the verdict, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();
    debug!("crmarker starting");

    match cli.command {
        Commands::Mark {
            request,
            prefix,
            student,
            suffix,
            ban_imports,
            interpreter,
            timeout_ms,
            work_root,
        } => {
            let source = match (request, student) {
                (Some(request), _) => Source::Request(request),
                (None, Some(student)) => Source::Files { prefix, student, suffix },
                (None, None) => anyhow::bail!("Either --request or --student is required"),
            };
            let overrides = Overrides { interpreter, timeout_ms, work_root };
            let verdict = commands::mark(source, cli.config.as_deref(), overrides, ban_imports).await?;
            info!(fraction = verdict.fraction, "Verdict emitted");
        }
        Commands::BanImports { student, no_exit } => {
            let clean = commands::ban_imports(&student, !no_exit)?;
            if !clean {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
