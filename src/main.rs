use std::process::ExitCode;

fn main() -> ExitCode {
    let Err(err) = macro_dash::app::run() else {
        return ExitCode::SUCCESS;
    };
    eprintln!("mdash: {err}");
    ExitCode::from(err.exit_code())
}
