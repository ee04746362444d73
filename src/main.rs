use std::process::ExitCode;

use mkgit::error::classify;
use mkgit::ui::output;

fn main() -> ExitCode {
    match mkgit::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{}: {:#}", classify(&err), err));
            ExitCode::FAILURE
        }
    }
}
