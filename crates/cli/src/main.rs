use std::process::ExitCode;

fn main() -> ExitCode {
    bottlescan_cli::run()
}
