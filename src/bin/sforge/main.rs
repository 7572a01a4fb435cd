use std::process::ExitCode;

mod cli;
mod display;
mod run;
mod util;

fn main() -> ExitCode {
    cli::parse();
    display::init_logging();

    match run::run(display::Context::detect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
