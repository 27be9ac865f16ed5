use crate::payroll::{run_points, run_report, PointsArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fundraiser_payroll::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fundraiser Payroll",
    about = "Score donations and assemble weekly fundraiser compensation reports",
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
    /// Format a ledger export into the weekly compensation report
    Report(ReportArgs),
    /// Score a single donation
    Points(PointsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Points(args) => {
            run_points(args);
            Ok(())
        }
    }
}
