use std::process::ExitCode;

use lattice::cli;
use lattice::core::errors::{CoreError, ErrorKind};

fn main() -> ExitCode {
    init_logging();

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code_for(&err)
        }
    }
}

/// `--debug` isn't parsed yet at this point, so honor `RUST_LOG` and fall
/// back to `info` - `cli::run` re-derives the effective verbosity from the
/// parsed flags for everything after this.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `RebaseInterrupted` gets its own exit code so shell automation can detect
/// "resume required" without parsing stderr.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err
        .downcast_ref::<CoreError>()
        .is_some_and(|e| e.is(ErrorKind::RebaseInterrupted))
    {
        return ExitCode::from(2);
    }
    ExitCode::FAILURE
}
