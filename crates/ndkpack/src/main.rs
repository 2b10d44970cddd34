use std::process::ExitCode;

fn main() -> ExitCode {
    match ndkpack::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(ndkpack::exit_code_for(&err))
        }
    }
}
