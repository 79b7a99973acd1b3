use crate::commands::{run_intake, run_pipeline, IntakeArgs, PipelineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use talent_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent AI Hiring Orchestrator",
    about = "Run the hiring pipeline and resume intake from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the hiring pipeline once for a departing employee from a roster CSV
    Pipeline(PipelineArgs),
    /// Score inbox resumes against the current requirements, once or on a schedule
    Intake(IntakeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON applicant list for the offline job board (defaults to a built-in sample pool)
    #[arg(long)]
    pub(crate) applicants: Option<PathBuf>,
    /// Also run resume intake on the configured interval while serving
    #[arg(long)]
    pub(crate) intake: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Pipeline(args) => run_pipeline(args).await,
        Command::Intake(args) => run_intake(args).await,
    }
}
