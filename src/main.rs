use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    multicam_lib::init_logging();

    match multicam_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
