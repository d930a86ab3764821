use std::process::ExitCode;

use clap::Parser;
use songdwh::cli::{self, CreateTablesCli, Job};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CreateTablesCli::parse();

    cli::init_tracing(cli.shared.verbose);

    cli::run(Job::Schema, &cli.shared, cli.shared.job_options()).await
}
