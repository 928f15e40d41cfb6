use crate::demo::{run_breakdown, run_demo, BreakdownArgs, DemoArgs};
use crate::server;
use care_billing::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Care Marketplace Billing",
    about = "Run the care marketplace billing service and demos from the command line",
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
    /// Print the commission breakdown for a single hypothetical booking
    Breakdown(BreakdownArgs),
    /// Run an end-to-end CLI demo covering settlement, protections, and upgrades
    Demo(DemoArgs),
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
        Command::Breakdown(args) => run_breakdown(args),
        Command::Demo(args) => run_demo(args),
    }
}
