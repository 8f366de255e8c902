use clap::error::ErrorKind;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = match itemflow_cli::command().try_get_matches() {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // keep argument errors on the same exit status as runtime errors
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    itemflow_cli::init_tracing(matches.get_flag("log-json"));

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    match itemflow_cli::execute(&matches, &mut stdin, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
