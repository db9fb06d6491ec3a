use std::process::ExitCode;

fn main() -> ExitCode {
    pressquote_cli::run()
}
