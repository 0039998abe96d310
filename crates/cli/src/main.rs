use std::process::ExitCode;

fn main() -> ExitCode {
    vitrine_cli::run()
}
