use std::process::ExitCode;

fn main() -> ExitCode {
    deskbot_cli::run()
}
