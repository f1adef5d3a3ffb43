mod app;
mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cli::Cli;
use exit_codes::ExitCode;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match app::run(cli) {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            eprintln!("loadsum: {err:#}");
            ExitCode::from_error(&err).into()
        }
    }
}

/// Logs go to stderr; stdout carries the CSV output of `summarize`.
fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
