use std::process::ExitCode;

fn main() -> ExitCode {
    racar_cli::run()
}
