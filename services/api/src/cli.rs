use crate::commands::{run_review_batch, BatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ticket_qa::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Ticket Quality Review Service",
    about = "Score support ticket quality from the command line or over HTTP",
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
    /// Run evaluations without the HTTP service
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewCommand {
    /// Evaluate every ticket in a CSV export and print the results as JSON
    Batch(BatchArgs),
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
        Command::Review {
            command: ReviewCommand::Batch(args),
        } => run_review_batch(args).await,
    }
}
