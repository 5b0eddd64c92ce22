use audio_slicer::{app, cli::Args, logging};
use clap::Parser;
use std::{panic, process::ExitCode};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init_logging(args.verbose, args.quiet);

    match panic::catch_unwind(|| app::run(args)) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}
