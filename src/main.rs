use std::process::ExitCode;

use gitmend::ui::output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match gitmend::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
