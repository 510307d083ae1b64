use conversense::{load_config, App, AppConfig, BootstrapError, Server};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("{}", BootstrapError::from(e));
        return ExitCode::FAILURE;
    }

    let config = load_config();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("conversense={0},tower_http={0}", config.log_level))),
        )
        .init();
    tracing::info!(env = %config.env, "configuration loaded");

    match bootstrap_and_run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn bootstrap_and_run(config: AppConfig) -> Result<(), BootstrapError> {
    let app = App::new(config).await?;
    let server = Server::new(app).await?;
    server.run().await
}
