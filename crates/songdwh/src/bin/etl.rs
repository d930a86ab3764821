use std::process::ExitCode;

use clap::Parser;
use songdwh::cli::{self, EtlCli, Job};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = EtlCli::parse();

    cli::init_tracing(cli.shared.verbose);

    cli::run(Job::Load, &cli.shared, cli.job_options()).await
}
